use std::cmp::Ordering;

use hashbrown::HashMap;

use crate::error::{CoreError, Result};
use crate::site::{SiteId, SiteTable};

/// Square table of precomputed site-to-site distances, stored row-major. Only used to pick
/// the nearest neighbours of each site, so the unit does not matter as long as it is
/// consistent.
#[derive(Clone, Debug, Default)]
pub struct DistanceTable {
    site_ids: Vec<SiteId>,
    index: HashMap<SiteId, usize>,
    values: Vec<f64>,
}

impl DistanceTable {
    pub fn new(site_ids: Vec<SiteId>, values: Vec<f64>) -> Result<Self> {
        let size = site_ids.len();
        if values.len() != size * size {
            return Err(CoreError::ShapeMismatch {
                size,
                expected: size * size,
                actual: values.len(),
            });
        }
        let mut index = HashMap::with_capacity(size);
        for (idx, site_id) in site_ids.iter().enumerate() {
            if index.insert(*site_id, idx).is_some() {
                return Err(CoreError::DuplicateSite(*site_id));
            }
        }
        Ok(Self {
            site_ids,
            index,
            values,
        })
    }

    /// Geodesic distances in meters between all sites of the table.
    pub fn from_sites(sites: &SiteTable) -> Self {
        let site_ids = sites.ids();
        let size = site_ids.len();
        let mut values = vec![0.0; size * size];
        let positions: Vec<_> = sites.iter().map(|site| site.position).collect();
        for row in 0..size {
            for col in (row + 1)..size {
                let distance = positions[row].distance_to(&positions[col]);
                values[row * size + col] = distance;
                values[col * size + row] = distance;
            }
        }
        let index = site_ids
            .iter()
            .enumerate()
            .map(|(idx, site_id)| (*site_id, idx))
            .collect();
        Self {
            site_ids,
            index,
            values,
        }
    }

    pub fn site_ids(&self) -> &[SiteId] {
        &self.site_ids
    }

    pub fn len(&self) -> usize {
        self.site_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.site_ids.is_empty()
    }

    pub fn contains(&self, site_id: SiteId) -> bool {
        self.index.contains_key(&site_id)
    }

    pub fn get(&self, from: SiteId, to: SiteId) -> Option<f64> {
        let row = *self.index.get(&from)?;
        let col = *self.index.get(&to)?;
        Some(self.values[row * self.site_ids.len() + col])
    }

    /// The `count` sites closest to `site_id`, closest first, including the site itself.
    /// Ties go to the smaller id and missing (NaN) distances sort last. Returns `None` when
    /// the site has no row in the table.
    pub fn nearest(&self, site_id: SiteId, count: usize) -> Option<Vec<SiteId>> {
        let row = *self.index.get(&site_id)?;
        let size = self.site_ids.len();
        let distances = &self.values[row * size..(row + 1) * size];
        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by(|a, b| {
            compare_distance(distances[*a], distances[*b])
                .then(self.site_ids[*a].cmp(&self.site_ids[*b]))
        });
        Some(
            order
                .into_iter()
                .take(count)
                .map(|idx| self.site_ids[idx])
                .collect(),
        )
    }

    /// Largest absolute difference between `d(a, b)` and `d(b, a)`.
    pub fn asymmetry(&self) -> f64 {
        let size = self.site_ids.len();
        let mut worst: f64 = 0.0;
        for row in 0..size {
            for col in (row + 1)..size {
                let diff = (self.values[row * size + col] - self.values[col * size + row]).abs();
                if !diff.is_nan() {
                    worst = worst.max(diff);
                }
            }
        }
        worst
    }
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<SiteId> {
        raw.iter().map(|id| SiteId::from(*id)).collect()
    }

    #[test]
    fn test_shape_is_checked() {
        let result = DistanceTable::new(ids(&[1, 2]), vec![0.0, 1.0, 1.0]);
        assert!(matches!(result, Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_nearest_includes_self_and_breaks_ties_by_id() {
        #[rustfmt::skip]
        let values = vec![
            0.0, 5.0, 2.0, 2.0,
            5.0, 0.0, 1.0, 9.0,
            2.0, 1.0, 0.0, 3.0,
            2.0, 9.0, 3.0, 0.0,
        ];
        let table = DistanceTable::new(ids(&[10, 20, 40, 30]), values).unwrap();
        assert_eq!(
            table.nearest(SiteId::from(10), 3).unwrap(),
            ids(&[10, 30, 40])
        );
        assert_eq!(table.nearest(SiteId::from(20), 2).unwrap(), ids(&[20, 40]));
        assert_eq!(table.nearest(SiteId::from(20), 10).unwrap().len(), 4);
        assert!(table.nearest(SiteId::from(99), 3).is_none());
        assert_eq!(table.asymmetry(), 0.0);
    }

    #[test]
    fn test_nan_sorts_last() {
        let values = vec![0.0, f64::NAN, 4.0, f64::NAN, 0.0, 1.0, 4.0, 1.0, 0.0];
        let table = DistanceTable::new(ids(&[1, 2, 3]), values).unwrap();
        assert_eq!(table.nearest(SiteId::from(1), 3).unwrap(), ids(&[1, 3, 2]));
    }
}
