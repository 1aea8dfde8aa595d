//! DeliveryMatcher - ready orders near a courier
//!
//! Distance is measured from the courier to the order's pickup point (the
//! restaurant), which is what a courier travels to first. Orders whose pickup
//! point can not be located are cancelled so they stop showing up.

use std::sync::Arc;

use shared::error::{AppError, AppResult};
use shared::models::{DeliveryOffer, GeoPoint, Partition};

use super::lifecycle::OrderLifecycle;
use super::storage::OrderStore;
use crate::services::GeoLocationProvider;

#[derive(Debug, Clone)]
pub struct DeliveryMatcher {
    orders: OrderStore,
    lifecycle: Arc<OrderLifecycle>,
    geo: Arc<dyn GeoLocationProvider>,
}

impl DeliveryMatcher {
    pub fn new(
        orders: OrderStore,
        lifecycle: Arc<OrderLifecycle>,
        geo: Arc<dyn GeoLocationProvider>,
    ) -> Self {
        Self {
            orders,
            lifecycle,
            geo,
        }
    }

    /// Ready-for-pickup orders within `max_km` of `location`, nearest first
    pub async fn find_available(
        &self,
        location: GeoPoint,
        max_km: f64,
    ) -> AppResult<Vec<DeliveryOffer>> {
        if !location.is_valid() {
            return Err(AppError::validation("courier location is not a valid coordinate"));
        }
        if !max_km.is_finite() || max_km < 0.0 {
            return Err(AppError::validation(format!(
                "search radius must be a non-negative number, got {max_km}"
            )));
        }

        let candidates = self.orders.list_by_partition(&Partition::ReadyForPickup)?;
        let mut offers = Vec::new();
        for order in candidates {
            let pickup = match order.pickup_location {
                Some(point) => Some(point),
                None => self.geo.resolve(&order.restaurant_address).await,
            };
            let Some(pickup) = pickup else {
                tracing::warn!(
                    order_id = order.id,
                    address = %order.restaurant_address,
                    "pickup point unresolvable, cancelling order"
                );
                // May race with a concurrent pick-up; the loser just logs
                if let Err(e) = self.lifecycle.cancel(order.id, "pickup location unresolvable") {
                    tracing::debug!(order_id = order.id, error = %e, "cancel skipped");
                }
                continue;
            };

            let distance_km = self.geo.distance_km(&location, &pickup);
            if distance_km <= max_km {
                offers.push(DeliveryOffer { order, distance_km });
            }
        }

        offers.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        tracing::debug!(found = offers.len(), max_km, "delivery search");
        Ok(offers)
    }
}
