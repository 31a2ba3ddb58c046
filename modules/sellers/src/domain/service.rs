use std::sync::Arc;

use chrono::Utc;
use integration_events::identity::{AccountId, AccountRole, CreateAccount};
use integration_events::sellers::SellerRegistered;
use modkit::bus::{BroadcastMode, BusError, CancellationToken, EventBus, Outcome};
use uuid::Uuid;

use crate::domain::model::{NewSeller, Seller};
use crate::domain::repo::SellerRepository;

/// Seller onboarding.
pub struct SellerService {
    bus: EventBus,
    sellers: Arc<SellerRepository>,
    announce_mode: BroadcastMode,
}

impl SellerService {
    pub fn new(bus: EventBus, sellers: Arc<SellerRepository>, announce_mode: BroadcastMode) -> Self {
        Self {
            bus,
            sellers,
            announce_mode,
        }
    }

    /// Register a seller.
    ///
    /// A failing account request is returned exactly as identity produced it
    /// and leaves no local trace. On success the seller is stored and
    /// `SellerRegistered` is broadcast; a failing broadcast is logged, the
    /// seller stays registered.
    #[tracing::instrument(skip_all, fields(shop = %new_seller.shop_name))]
    pub async fn register(
        &self,
        new_seller: NewSeller,
        cancel: &CancellationToken,
    ) -> Result<Outcome<Seller>, BusError> {
        let shop_name = new_seller.shop_name.trim().to_owned();
        if shop_name.is_empty() {
            return Ok(Outcome::bad_request("shop name cannot be empty"));
        }

        let request = CreateAccount {
            email: new_seller.email,
            display_name: new_seller.display_name,
            role: AccountRole::Customer,
        };
        let account_id = match self
            .bus
            .publish_for_answer::<_, AccountId>(request, cancel)
            .await?
            .into_result()
        {
            Ok(id) => id,
            Err(failure) => {
                tracing::debug!(error = %failure, "account request failed; seller not registered");
                return Ok(failure.into());
            }
        };

        let seller = Seller {
            id: Uuid::new_v4(),
            account_id,
            shop_name,
            registered_at: Utc::now(),
        };
        self.sellers.insert(seller.clone());
        tracing::info!(seller_id = %seller.id, %account_id, "seller registered");

        let announced = self
            .bus
            .publish_broadcast_with(
                SellerRegistered {
                    seller_id: seller.id,
                    account_id,
                    registered_at: seller.registered_at,
                },
                self.announce_mode,
                cancel,
            )
            .await?;
        if let Some(failure) = announced.as_failure() {
            tracing::warn!(seller_id = %seller.id, error = %failure, "SellerRegistered handler failed");
        }

        Ok(Outcome::created(seller))
    }

    pub fn get(&self, id: Uuid) -> Option<Seller> {
        self.sellers.get(id)
    }
}
