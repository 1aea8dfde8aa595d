//! Payment instrument authentication

use async_trait::async_trait;
use shared::models::PaymentCard;
use thiserror::Error;

use crate::utils::time::current_year_month;

#[async_trait]
pub trait PaymentAuthenticator: Send + Sync + std::fmt::Debug {
    async fn authenticate(&self, card: &PaymentCard) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardRejection {
    #[error("card number failed checksum")]
    InvalidNumber,
    #[error("expiry must be MM/YY")]
    MalformedExpiry,
    #[error("card has expired")]
    Expired,
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
}

/// Offline card checks: Luhn, expiry not in the past, CVV shape
#[derive(Debug, Default, Clone, Copy)]
pub struct CardValidator;

impl CardValidator {
    pub fn validate(&self, card: &PaymentCard) -> Result<(), CardRejection> {
        let digits: String = card
            .card_number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !(12..=19).contains(&digits.len()) || !luhn(&digits) {
            return Err(CardRejection::InvalidNumber);
        }

        let (month, year) = parse_expiry(&card.expiry).ok_or(CardRejection::MalformedExpiry)?;
        let (now_year, now_month) = current_year_month();
        // valid through the last day of the expiry month
        if (year, month) < (now_year, now_month) {
            return Err(CardRejection::Expired);
        }

        let cvv = card.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardRejection::InvalidCvv);
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentAuthenticator for CardValidator {
    async fn authenticate(&self, card: &PaymentCard) -> bool {
        match self.validate(card) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(%reason, "card rejected");
                false
            }
        }
    }
}

fn luhn(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// `MM/YY` → (month, full year)
fn parse_expiry(expiry: &str) -> Option<(u32, i32)> {
    let (mm, yy) = expiry.trim().split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    (1..=12).contains(&month).then_some((month, 2000 + year))
}
