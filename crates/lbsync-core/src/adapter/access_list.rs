//! Access-list replacement
//!
//! The device has no atomic "replace access list" primitive: the protection
//! object's lists are cleared and rewritten in separate calls. Replacement is
//! deliberately non-transactional — a midway failure can leave the lists
//! partially cleared, and the caller converges by re-issuing the update.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::AccessListEntry;
use crate::traits::{DeviceError, DeviceResult};

use super::VirtualServiceAdapter;

impl VirtualServiceAdapter {
    /// Replace a load balancer's access list with the supplied entries
    ///
    /// The entries are the complete desired list: the ALLOW subset becomes
    /// the protection object's allow-list and the DENY subset its deny-list.
    /// The protection object is created on first use; creation against an
    /// existing object is detected and skipped, and the creation hook fires
    /// only on genuine first creation.
    pub async fn update_access_list(
        &self,
        account_id: u32,
        lb_id: u32,
        entries: &[AccessListEntry],
    ) -> Result<()> {
        validate_entries(entries)?;

        let protection = self.naming().listener_name(account_id, lb_id);
        debug!("updating access list for protection '{protection}'");

        if self.device().create_protection(&protection).await? {
            self.hooks()
                .protection_created(self.device(), account_id, lb_id)
                .await?;
        }

        info!("removing the old access list for '{protection}'");
        self.clear_address_lists(&protection).await?;

        debug!("adding the new access list for '{protection}'");
        let (allow, deny) = partition_by_kind(entries);
        self.device()
            .set_allowed_addresses(&protection, &allow)
            .await?;
        self.device()
            .set_banned_addresses(&protection, &deny)
            .await?;

        info!("successfully updated access list for protection '{protection}'");
        Ok(())
    }

    /// Delete a load balancer's access list and its protection object
    ///
    /// A protection object that does not exist, or that the device still
    /// holds a live reference to, leaves the operation successful: the first
    /// case is already satisfied, the second is an accepted inconsistency the
    /// caller may retry. Any other failure propagates.
    pub async fn delete_access_list(&self, account_id: u32, lb_id: u32) -> Result<()> {
        let protection = self.naming().listener_name(account_id, lb_id);

        match self.remove_protection(&protection).await {
            Ok(()) => {
                info!("deleted access list for protection '{protection}'");
                Ok(())
            }
            Err(DeviceError::NotFound(_)) => {
                warn!("protection object '{protection}' already deleted");
                Ok(())
            }
            Err(DeviceError::InUse(_)) => {
                warn!("protection object '{protection}' is currently in use, cannot delete");
                Ok(())
            }
            Err(cause) => Err(cause.into()),
        }
    }

    /// Clear both address lists without touching the protection object itself
    async fn clear_address_lists(&self, protection: &str) -> Result<()> {
        let allowed = self.device().allowed_addresses(protection).await?;
        let banned = self.device().banned_addresses(protection).await?;

        if !allowed.is_empty() {
            self.device()
                .remove_allowed_addresses(protection, &allowed)
                .await?;
        }
        if !banned.is_empty() {
            self.device()
                .remove_banned_addresses(protection, &banned)
                .await?;
        }

        Ok(())
    }

    /// Remove both address lists, then the protection object
    ///
    /// Classified as a whole by the caller, so an object vanishing between
    /// any two of these calls reads as NotFound for the entire sequence.
    async fn remove_protection(&self, protection: &str) -> DeviceResult<()> {
        let allowed = self.device().allowed_addresses(protection).await?;
        let banned = self.device().banned_addresses(protection).await?;

        if !allowed.is_empty() {
            self.device()
                .remove_allowed_addresses(protection, &allowed)
                .await?;
        }
        if !banned.is_empty() {
            self.device()
                .remove_banned_addresses(protection, &banned)
                .await?;
        }

        self.device().delete_protection(protection).await
    }
}

/// Reject entries the device would silently misapply, before any remote call
fn validate_entries(entries: &[AccessListEntry]) -> Result<()> {
    for entry in entries {
        if entry.ip_address.trim().is_empty() {
            return Err(Error::validation(
                "access-list entries must carry a non-empty address",
            ));
        }
    }
    Ok(())
}

/// Split entries into (allow, deny) address lists
///
/// Pure: preserves caller order within each kind and passes duplicates
/// through unchanged; the device defines its own de-duplication semantics.
fn partition_by_kind(entries: &[AccessListEntry]) -> (Vec<String>, Vec<String>) {
    let mut allow = Vec::new();
    let mut deny = Vec::new();

    for entry in entries {
        match entry.kind {
            crate::model::AccessListKind::Allow => allow.push(entry.ip_address.clone()),
            crate::model::AccessListKind::Deny => deny.push(entry.ip_address.clone()),
        }
    }

    (allow, deny)
}
