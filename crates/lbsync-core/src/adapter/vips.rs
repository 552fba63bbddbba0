//! Virtual-IP binding reconciliation
//!
//! Attaching is a single additive device call and needs no compensation.
//! Deletion is the hard path: the listener's listen-set must be committed
//! without the doomed groups *before* those groups are deleted, and a failed
//! deletion must restore the listen-set the listener had when the operation
//! started.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::model::LoadBalancer;
use crate::traits::DeviceError;

use super::VirtualServiceAdapter;

const DELETE_VIPS_CANCELED: &str = "delete virtual ips request canceled";

impl VirtualServiceAdapter {
    /// Attach virtual IPs to a load balancer's listener
    ///
    /// Pairs every supplied virtual IP with the load balancer and instructs
    /// the device to begin listening on the corresponding traffic groups,
    /// creating any that do not exist yet. The attach call is additive and
    /// idempotent at the device level, so no cleanup is attempted on failure.
    pub async fn add_virtual_ips(
        &self,
        account_id: u32,
        lb_id: u32,
        ipv4_ids: &BTreeSet<u32>,
        ipv6_ids: &BTreeSet<u32>,
    ) -> Result<()> {
        let lb = LoadBalancer::new(account_id, lb_id)
            .with_virtual_ips(ipv4_ids.clone(), ipv6_ids.clone());

        self.attach_virtual_ips(&lb).await
    }

    /// Delete virtual-IP bindings from a load balancer's listener
    ///
    /// On success the listener's listen-set equals exactly its previous
    /// listen-set minus the groups named by `vip_ids`, and those groups no
    /// longer exist on the device. Any failure reports a rollback-class
    /// error; if the group-deletion step fails, the listener is restored to
    /// the full listen-set it had before the operation and every group in it
    /// is re-enabled.
    pub async fn delete_virtual_ips(&self, lb: &LoadBalancer, vip_ids: &[u32]) -> Result<()> {
        let listener = self.naming().listener_name(lb.account_id, lb.id);

        let current = match self.device().listen_groups(&listener).await {
            Ok(groups) => groups,
            Err(cause) => {
                if matches!(cause, DeviceError::NotFound(_)) {
                    error!("cannot delete virtual ips from '{listener}': the listener does not exist");
                }
                return Err(Error::rollback(DELETE_VIPS_CANCELED, cause));
            }
        };

        let to_delete: BTreeSet<String> = vip_ids
            .iter()
            .map(|vip| self.naming().group_name(lb.account_id, lb.id, *vip))
            .collect();

        // Membership is decided by name; the device reports the listen-set
        // unordered.
        let keep: BTreeSet<String> = current.difference(&to_delete).cloned().collect();

        // Re-enable the survivors in case a prior partial failure left any of
        // them disabled.
        let keep_list: Vec<String> = keep.iter().cloned().collect();
        if !keep_list.is_empty() {
            self.device()
                .set_groups_enabled(&keep_list, true)
                .await
                .map_err(|cause| Error::rollback(DELETE_VIPS_CANCELED, cause))?;
        }

        if let Err(cause) = self.device().set_listen_groups(&listener, &keep).await {
            if matches!(cause, DeviceError::NotFound(_)) {
                error!("cannot commit listen groups to '{listener}': the listener vanished");
            }
            return Err(Error::rollback(DELETE_VIPS_CANCELED, cause));
        }

        if !to_delete.is_empty() {
            let doomed: Vec<String> = to_delete.iter().cloned().collect();
            if let Err(cause) = self.device().delete_groups(&doomed).await {
                error!("group deletion failed, restoring the previous listen groups of '{listener}'");
                self.restore_listen_groups(&listener, &current).await;
                return Err(Error::rollback(DELETE_VIPS_CANCELED, cause));
            }

            debug!("deleted {} traffic groups from '{listener}'", to_delete.len());
        }

        info!("successfully deleted virtual ips from '{listener}'");
        Ok(())
    }

    /// Compute the desired binding set and issue the attach call
    async fn attach_virtual_ips(&self, lb: &LoadBalancer) -> Result<()> {
        let listener = self.naming().listener_name(lb.account_id, lb.id);

        let groups: BTreeSet<String> = lb
            .virtual_ip_ids
            .iter()
            .chain(lb.virtual_ip6_ids.iter())
            .map(|vip| self.naming().group_name(lb.account_id, lb.id, *vip))
            .collect();

        if groups.is_empty() {
            debug!("no virtual ips supplied for '{listener}', nothing to attach");
            return Ok(());
        }

        self.device().add_listen_groups(&listener, &groups).await?;

        info!("attached {} traffic groups to '{listener}'", groups.len());
        Ok(())
    }

    /// Best-effort compensation: put the pre-delete listen-set back and
    /// re-enable every group in it. Failures are logged only; the caller
    /// surfaces the original cause.
    async fn restore_listen_groups(&self, listener: &str, previous: &BTreeSet<String>) {
        if let Err(e) = self.device().set_listen_groups(listener, previous).await {
            warn!("failed to restore listen groups for '{listener}': {e}");
        }

        let all: Vec<String> = previous.iter().cloned().collect();
        if all.is_empty() {
            return;
        }
        if let Err(e) = self.device().set_groups_enabled(&all, true).await {
            warn!("failed to re-enable traffic groups for '{listener}': {e}");
        }
    }
}
