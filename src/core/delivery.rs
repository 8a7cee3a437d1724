//! Delivery resolution - Validates the fields required by the chosen delivery type.
//!
//! `HOME` orders need a street and a city; `BOUTIQUE` orders need an existing pickup
//! boutique. The resolved value carries only the fields that belong to its branch, so
//! an order can never end up with both an address and a pickup boutique.

use crate::{
    core::{catalog, intake::DeliveryAddressRequest},
    entities::DeliveryType,
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use serde::Serialize;

/// A complete home delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    /// Trimmed, non-empty
    pub street: String,
    /// Trimmed, non-empty
    pub city: String,
    /// Trimmed; `None` when blank
    pub state: Option<String>,
    /// Trimmed; `None` when blank
    pub postal_code: Option<String>,
}

/// Delivery fields resolved on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDelivery {
    /// Ship to this address
    Home(DeliveryAddress),
    /// Customer collects at this boutique
    Boutique {
        /// Id of an existing, active boutique
        boutique_id: String,
    },
}

impl ResolvedDelivery {
    /// The delivery type this resolution belongs to.
    #[must_use]
    pub const fn delivery_type(&self) -> DeliveryType {
        match self {
            Self::Home(_) => DeliveryType::Home,
            Self::Boutique { .. } => DeliveryType::Boutique,
        }
    }
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validates a home delivery address. No I/O.
pub fn resolve_home_address(address: Option<&DeliveryAddressRequest>) -> Result<DeliveryAddress> {
    let address =
        address.ok_or_else(|| Error::validation("deliveryAddress", "is required for HOME delivery"))?;

    let street = trimmed(address.street.as_ref())
        .ok_or_else(|| Error::validation("deliveryAddress.street", "is required"))?;
    let city = trimmed(address.city.as_ref())
        .ok_or_else(|| Error::validation("deliveryAddress.city", "is required"))?;

    Ok(DeliveryAddress {
        street,
        city,
        state: trimmed(address.state.as_ref()),
        postal_code: trimmed(address.postal_code.as_ref()),
    })
}

/// Checks that `boutique_id` is present and names an active boutique.
pub async fn resolve_pickup_boutique<C>(db: &C, boutique_id: Option<&str>) -> Result<String>
where
    C: ConnectionTrait,
{
    let boutique_id = boutique_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            Error::validation("pickupBoutiqueId", "is required for BOUTIQUE delivery")
        })?;

    let boutique = catalog::get_active_boutique(db, boutique_id)
        .await?
        .ok_or_else(|| Error::not_found("Boutique", boutique_id))?;

    Ok(boutique.id)
}

/// Resolves the delivery fields for `delivery_type`.
///
/// Fields that belong to the other branch are ignored.
pub async fn resolve_delivery<C>(
    db: &C,
    delivery_type: DeliveryType,
    address: Option<&DeliveryAddressRequest>,
    pickup_boutique_id: Option<&str>,
) -> Result<ResolvedDelivery>
where
    C: ConnectionTrait,
{
    match delivery_type {
        DeliveryType::Home => resolve_home_address(address).map(ResolvedDelivery::Home),
        DeliveryType::Boutique => {
            let boutique_id = resolve_pickup_boutique(db, pickup_boutique_id).await?;
            Ok(ResolvedDelivery::Boutique { boutique_id })
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn address(street: Option<&str>, city: Option<&str>) -> DeliveryAddressRequest {
        DeliveryAddressRequest {
            street: street.map(str::to_string),
            city: city.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_home_requires_street() {
        let err = resolve_home_address(Some(&address(None, Some("Y")))).unwrap_err();
        assert!(
            matches!(err, Error::Validation { field, .. } if field == "deliveryAddress.street")
        );

        let err = resolve_home_address(Some(&address(Some("  "), Some("Y")))).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_home_requires_city() {
        let err = resolve_home_address(Some(&address(Some("X"), None))).unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "deliveryAddress.city"));
    }

    #[test]
    fn test_home_requires_address() {
        let err = resolve_home_address(None).unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "deliveryAddress"));
    }

    #[test]
    fn test_home_with_street_and_city_succeeds() {
        let mut request = address(Some(" X "), Some("Y"));
        request.postal_code = Some("560038".to_string());
        request.state = Some(String::new());

        let resolved = resolve_home_address(Some(&request)).unwrap();
        assert_eq!(resolved.street, "X");
        assert_eq!(resolved.city, "Y");
        assert_eq!(resolved.postal_code.as_deref(), Some("560038"));
        assert_eq!(resolved.state, None);
    }

    #[tokio::test]
    async fn test_boutique_must_exist() -> Result<()> {
        let db = setup_with_catalog().await?;

        let err = resolve_delivery(&db, DeliveryType::Boutique, None, Some("B404"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "Boutique", .. }));

        let err = resolve_delivery(&db, DeliveryType::Boutique, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field, .. } if field == "pickupBoutiqueId"));

        Ok(())
    }

    #[tokio::test]
    async fn test_boutique_resolution_ignores_address() -> Result<()> {
        let db = setup_with_catalog().await?;

        let resolved = resolve_delivery(
            &db,
            DeliveryType::Boutique,
            Some(&address(Some("X"), Some("Y"))),
            Some("B1"),
        )
        .await?;
        assert_eq!(
            resolved,
            ResolvedDelivery::Boutique {
                boutique_id: "B1".to_string()
            }
        );
        assert_eq!(resolved.delivery_type(), DeliveryType::Boutique);

        Ok(())
    }

    #[tokio::test]
    async fn test_home_resolution_ignores_boutique() -> Result<()> {
        let db = setup_with_catalog().await?;

        let resolved = resolve_delivery(
            &db,
            DeliveryType::Home,
            Some(&address(Some("X"), Some("Y"))),
            Some("B404"),
        )
        .await?;
        assert_eq!(resolved.delivery_type(), DeliveryType::Home);

        Ok(())
    }
}
