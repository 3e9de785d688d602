use std::f64::consts::PI;

/// WebMercator semi-major axis
const R_MAJOR: f64 = 6378137.0;

/// Half the WebMercator world span in metres
pub const MERCATOR_BOUND: f64 = 20037508.342789244;

/// longitude, latitude (degrees) → Web Mercator (x, y in metres)
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * R_MAJOR * PI / 180.0;
    let lat_rad = lat * PI / 180.0;
    let y = R_MAJOR * ((PI / 4.0 + lat_rad / 2.0).tan().ln());
    (x, y)
}

/// Web Mercator (x, y in metres) → longitude, latitude (degrees)
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = x / (R_MAJOR * PI / 180.0);
    let lat_rad = 2.0 * ((y / R_MAJOR).exp().atan()) - PI / 2.0;
    let lat = lat_rad * 180.0 / PI;
    (lon, lat)
}

/// Bounding box in EPSG:3857 of a slippy-map tile.
/// https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
pub fn tile_bounds(z: u8, x: u32, y: u32, tile_size: u32) -> (f64, f64, f64, f64) {
    let tile_size = tile_size as f64;
    let initial_resolution = 2.0 * MERCATOR_BOUND / tile_size;
    let res = initial_resolution / (2f64.powi(z as i32));
    let minx = x as f64 * tile_size * res - MERCATOR_BOUND;
    let maxx = (x as f64 + 1.0) * tile_size * res - MERCATOR_BOUND;
    let maxy = MERCATOR_BOUND - y as f64 * tile_size * res;
    let miny = MERCATOR_BOUND - (y as f64 + 1.0) * tile_size * res;
    (minx, miny, maxx, maxy)
}
