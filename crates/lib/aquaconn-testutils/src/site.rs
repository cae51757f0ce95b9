use aquaconn_core::geo::GeoPoint;
use aquaconn_core::site::{Site, SiteId, SiteTable};

pub fn make_site(id: u64, name: &str, lon: f64, lat: f64) -> Site {
    Site::builder()
        .id(SiteId::from(id))
        .name(name)
        .position(GeoPoint::new(lon, lat))
        .build()
}

pub fn make_site_table(sites: &[(u64, &str, f64, f64)]) -> SiteTable {
    let sites = sites
        .iter()
        .map(|(id, name, lon, lat)| make_site(*id, name, *lon, *lat))
        .collect();
    SiteTable::new(sites).expect("fixture sites must be unique")
}

/// `count` sites in a row going north from 63.5N 8.5E, `spacing_m` meters apart,
/// with ids 100, 101, ...
pub fn sites_in_a_row(count: usize, spacing_m: f64) -> SiteTable {
    let origin = GeoPoint::new(8.5, 63.5);
    let sites = (0..count)
        .map(|idx| {
            let position = crate::trajectory::offset(&origin, spacing_m * idx as f64, 0.0);
            make_site(
                100 + idx as u64,
                &format!("Site {}", idx),
                position.lon,
                position.lat,
            )
        })
        .collect();
    SiteTable::new(sites).expect("fixture sites must be unique")
}
