use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use hashbrown::HashMap;
use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::error::{CoreError, Result};
use crate::geo::GeoPoint;

/// Identifier of an aquaculture site (the locality number). Particles carry it as their
/// origin marker, and both axes of the distance table and the connectivity matrix are
/// indexed by it.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SiteId(u64);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let id = s.trim().parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for SiteId {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl SiteId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Site {
    pub id: SiteId,
    #[builder(setter(into))]
    pub name: String,
    pub position: GeoPoint,
}

/// The immutable list of sites for a run, in file order, with a lookup by id.
#[derive(Clone, Debug, Default)]
pub struct SiteTable {
    sites: Vec<Site>,
    index: HashMap<SiteId, usize>,
}

impl SiteTable {
    pub fn new(sites: Vec<Site>) -> Result<Self> {
        let mut index = HashMap::with_capacity(sites.len());
        for (idx, site) in sites.iter().enumerate() {
            if index.insert(site.id, idx).is_some() {
                return Err(CoreError::DuplicateSite(site.id));
            }
        }
        Ok(Self { sites, index })
    }

    pub fn get(&self, site_id: SiteId) -> Option<&Site> {
        self.index.get(&site_id).map(|idx| &self.sites[*idx])
    }

    pub fn contains(&self, site_id: SiteId) -> bool {
        self.index.contains_key(&site_id)
    }

    pub fn name_of(&self, site_id: SiteId) -> Option<&str> {
        self.get(site_id).map(|site| site.name.as_str())
    }

    pub fn ids(&self) -> Vec<SiteId> {
        self.sites.iter().map(|site| site.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sites ordered by display name, ties broken by id.
    pub fn sorted_by_name(&self) -> Vec<&Site> {
        let mut sorted: Vec<&Site> = self.sites.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: u64, name: &str) -> Site {
        Site::builder()
            .id(SiteId::from(id))
            .name(name)
            .position(GeoPoint::new(8.5, 63.6))
            .build()
    }

    #[test]
    fn test_site_id_parsing() {
        assert_eq!(" 30560".parse::<SiteId>().unwrap(), SiteId::from(30560));
        assert!("abc".parse::<SiteId>().is_err());
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let result = SiteTable::new(vec![site(1, "A"), site(1, "B")]);
        assert_eq!(result.unwrap_err(), CoreError::DuplicateSite(SiteId::from(1)));
    }

    #[test]
    fn test_lookup_and_ordering() {
        let table = SiteTable::new(vec![site(3, "Tristeinen"), site(1, "Aukan")]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name_of(SiteId::from(3)), Some("Tristeinen"));
        assert!(!table.contains(SiteId::from(2)));
        assert_eq!(table.ids(), vec![SiteId::from(3), SiteId::from(1)]);
        let names: Vec<&str> = table
            .sorted_by_name()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Aukan", "Tristeinen"]);
    }
}
