use crate::Fault;
use gcm_mesh::ZoneId;
use gcm_net::Rank;

/// Immutable `zone_id -> owning rank` table, loaded once at startup
/// and consulted read-only by every protocol thereafter.
#[derive(Clone, Debug)]
pub struct ZoneMap {
    owners: Vec<Rank>,
}

impl ZoneMap {
    /// `owners[z]` is the rank that owns zone `z`. Zones are dense,
    /// `0..owners.len()`.
    pub fn new(owners: Vec<Rank>) -> Self {
        ZoneMap { owners }
    }

    pub fn owner(&self, zone: ZoneId) -> Result<Rank, Fault> {
        self.owners
            .get(zone.index())
            .copied()
            .ok_or(Fault::UnknownZone(zone))
    }

    pub fn is_local(&self, zone: ZoneId, self_rank: Rank) -> Result<bool, Fault> {
        Ok(self.owner(zone)? == self_rank)
    }

    /// Every zone id, in total order.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        (0..self.owners.len() as u32).map(ZoneId)
    }

    pub fn zone_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn map() -> ZoneMap {
        ZoneMap::new(vec![Rank(0), Rank(0), Rank(1)])
    }

    #[test]
    fn owner_resolves_in_range_zones() {
        let m = map();
        assert_eq!(m.owner(ZoneId(0)).unwrap(), Rank(0));
        assert_eq!(m.owner(ZoneId(2)).unwrap(), Rank(1));
    }

    #[test]
    fn owner_fails_out_of_range() {
        let m = map();
        assert!(matches!(m.owner(ZoneId(3)), Err(Fault::UnknownZone(ZoneId(3)))));
    }

    #[test]
    fn is_local_reflects_ownership() {
        let m = map();
        assert!(m.is_local(ZoneId(0), Rank(0)).unwrap());
        assert!(!m.is_local(ZoneId(2), Rank(0)).unwrap());
    }

    #[test]
    fn zones_are_in_total_order() {
        let m = map();
        let zones: Vec<_> = m.zones().collect();
        assert_eq!(zones, vec![ZoneId(0), ZoneId(1), ZoneId(2)]);
    }
}
