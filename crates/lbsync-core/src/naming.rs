//! Deterministic naming for remote-side objects
//!
//! Every device object this adapter touches is addressed by a name derived
//! from the owning account, the load balancer, and (for traffic groups) the
//! virtual IP. The derivation is pure and collision-free: each numeric id is
//! preceded by a non-numeric marker, so two distinct id tuples can never
//! format to the same string.
//!
//! The protection object enforcing a load balancer's access list shares the
//! listener's name.

/// Name of the listener (and its protection object) for a load balancer
pub fn listener_name(account_id: u32, lb_id: u32) -> String {
    format!("acct{account_id}_lb{lb_id}")
}

/// Name of the traffic group binding one virtual IP to a load balancer
pub fn group_name(account_id: u32, lb_id: u32, virtual_ip_id: u32) -> String {
    format!("acct{account_id}_lb{lb_id}_vip{virtual_ip_id}")
}

/// Naming strategy for remote-side objects
///
/// Implementations must be pure: equal inputs produce equal names, distinct
/// inputs produce distinct names.
pub trait NamingScheme: Send + Sync {
    /// Listener (and protection object) name for a load balancer
    fn listener_name(&self, account_id: u32, lb_id: u32) -> String;

    /// Traffic-group name for one virtual IP of a load balancer
    fn group_name(&self, account_id: u32, lb_id: u32, virtual_ip_id: u32) -> String;
}

/// Default account-scoped naming scheme
///
/// Produces `acct{a}_lb{l}` and `acct{a}_lb{l}_vip{v}`.
pub struct AccountNaming;

impl NamingScheme for AccountNaming {
    fn listener_name(&self, account_id: u32, lb_id: u32) -> String {
        listener_name(account_id, lb_id)
    }

    fn group_name(&self, account_id: u32, lb_id: u32, virtual_ip_id: u32) -> String {
        group_name(account_id, lb_id, virtual_ip_id)
    }
}
