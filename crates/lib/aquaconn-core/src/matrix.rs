use hashbrown::HashMap;

use crate::error::{CoreError, Result};
use crate::site::SiteId;

/// Square site-by-site table of connectivity percentages. Rows are target sites and columns
/// are origin sites: `get(target, origin)` is the share of particles seeded at `origin` that
/// came within the threshold distance of `target`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectivityMatrix {
    site_ids: Vec<SiteId>,
    index: HashMap<SiteId, usize>,
    values: Vec<f64>,
}

impl ConnectivityMatrix {
    pub fn zeros(site_ids: Vec<SiteId>) -> Result<Self> {
        let size = site_ids.len();
        Self::from_values(site_ids, vec![0.0; size * size])
    }

    pub fn from_values(site_ids: Vec<SiteId>, values: Vec<f64>) -> Result<Self> {
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

    pub fn site_ids(&self) -> &[SiteId] {
        &self.site_ids
    }

    pub fn len(&self) -> usize {
        self.site_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.site_ids.is_empty()
    }

    pub fn index_of(&self, site_id: SiteId) -> Option<usize> {
        self.index.get(&site_id).copied()
    }

    pub fn get(&self, target: SiteId, origin: SiteId) -> Option<f64> {
        let row = self.index_of(target)?;
        let col = self.index_of(origin)?;
        Some(self.values[row * self.site_ids.len() + col])
    }

    pub fn set(&mut self, target: SiteId, origin: SiteId, value: f64) -> Result<()> {
        let row = self
            .index_of(target)
            .ok_or(CoreError::UnknownSite(target))?;
        let col = self
            .index_of(origin)
            .ok_or(CoreError::UnknownSite(origin))?;
        let size = self.site_ids.len();
        self.values[row * size + col] = value;
        Ok(())
    }

    pub fn row(&self, target: SiteId) -> Option<&[f64]> {
        let row = self.index_of(target)?;
        let size = self.site_ids.len();
        Some(&self.values[row * size..(row + 1) * size])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// All cells as `(target, origin, value)`, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (SiteId, SiteId, f64)> + '_ {
        let size = self.site_ids.len();
        self.values.iter().enumerate().map(move |(idx, value)| {
            (self.site_ids[idx / size], self.site_ids[idx % size], *value)
        })
    }

    /// The matrix restricted to `site_ids`, in the given order on both axes.
    pub fn submatrix(&self, site_ids: &[SiteId]) -> Result<Self> {
        let size = self.site_ids.len();
        let positions = site_ids
            .iter()
            .map(|site_id| self.index_of(*site_id).ok_or(CoreError::UnknownSite(*site_id)))
            .collect::<Result<Vec<usize>>>()?;
        let mut values = Vec::with_capacity(positions.len() * positions.len());
        for row in positions.iter() {
            for col in positions.iter() {
                values.push(self.values[row * size + col]);
            }
        }
        Self::from_values(site_ids.to_vec(), values)
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<SiteId> {
        raw.iter().map(|id| SiteId::from(*id)).collect()
    }

    #[test]
    fn test_set_and_get() {
        let mut matrix = ConnectivityMatrix::zeros(ids(&[5, 7])).unwrap();
        matrix.set(SiteId::from(7), SiteId::from(5), 40.0).unwrap();
        assert_eq!(matrix.get(SiteId::from(7), SiteId::from(5)), Some(40.0));
        assert_eq!(matrix.get(SiteId::from(5), SiteId::from(7)), Some(0.0));
        assert_eq!(matrix.row(SiteId::from(7)).unwrap(), &[40.0, 0.0]);
        assert_eq!(
            matrix.set(SiteId::from(9), SiteId::from(5), 1.0),
            Err(CoreError::UnknownSite(SiteId::from(9)))
        );
        assert_eq!(matrix.max_value(), 40.0);
    }

    #[test]
    fn test_submatrix_reorders() {
        let matrix = ConnectivityMatrix::from_values(
            ids(&[1, 2, 3]),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        )
        .unwrap();
        let sub = matrix.submatrix(&ids(&[3, 1])).unwrap();
        assert_eq!(sub.values(), &[9.0, 7.0, 3.0, 1.0]);
        assert!(matrix.submatrix(&ids(&[1, 4])).is_err());
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let matrix =
            ConnectivityMatrix::from_values(ids(&[1, 2]), vec![0.0, 10.0, 20.0, 0.0]).unwrap();
        let cells: Vec<_> = matrix.cells().collect();
        assert_eq!(cells[1], (SiteId::from(1), SiteId::from(2), 10.0));
        assert_eq!(cells[2], (SiteId::from(2), SiteId::from(1), 20.0));
    }
}
