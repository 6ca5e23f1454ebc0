//! The four checkout steps and their progress-indicator status.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a step number is outside `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no checkout step numbered {0}")]
pub struct UnknownStep(pub u8);

/// A checkout step, in progression order.
///
/// Serialized as its step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CheckoutStep {
    /// Review line items and totals.
    CartReview = 1,
    /// Choose or enter a delivery address.
    Delivery = 2,
    /// Choose a payment method and place the order.
    Payment = 3,
    /// Terminal: the order has been created.
    Confirmation = 4,
}

impl CheckoutStep {
    /// Every step in progression order.
    pub const ALL: [Self; 4] = [
        Self::CartReview,
        Self::Delivery,
        Self::Payment,
        Self::Confirmation,
    ];

    /// The 1-based step number.
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::CartReview => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// Title shown in the progress indicator.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::CartReview => "Cart Review",
            Self::Delivery => "Delivery Address",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl TryFrom<u8> for CheckoutStep {
    type Error = UnknownStep;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Self::CartReview),
            2 => Ok(Self::Delivery),
            3 => Ok(Self::Payment),
            4 => Ok(Self::Confirmation),
            other => Err(UnknownStep(other)),
        }
    }
}

impl From<CheckoutStep> for u8 {
    fn from(step: CheckoutStep) -> Self {
        step.number()
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Progress-indicator status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Validated and left, or behind the current step.
    Completed,
    /// The current step.
    Active,
    /// Not reached yet.
    Pending,
}
