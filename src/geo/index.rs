//! Spatial index - uniform grid over parcel bounding boxes for point lookup

use crate::geo::parcel::Parcel;
use geo::{BoundingRect, Contains, Point, Rect};
use std::collections::HashMap;
use tracing::info;

const MAX_GRID_DIM: usize = 256;

/// Uniform-grid index over parcel bounding boxes
///
/// Point lookup walks one grid cell's candidates instead of the whole
/// parcel set. Cell count scales with sqrt of the parcel count.
pub struct ParcelIndex {
    parcels: Vec<Parcel>,
    bboxes: Vec<Rect<f64>>,
    by_pin: HashMap<String, usize>,
    extent: Option<Rect<f64>>,
    dim: usize,
    cells: Vec<Vec<usize>>,
}

impl ParcelIndex {
    pub fn build(parcels: Vec<Parcel>) -> Self {
        let bboxes: Vec<Option<Rect<f64>>> = parcels
            .iter()
            .map(|p| p.geometry.bounding_rect())
            .collect();

        let extent = bboxes.iter().flatten().copied().reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        });

        let dim = ((parcels.len() as f64).sqrt().ceil() as usize)
            .clamp(1, MAX_GRID_DIM);
        let mut cells = vec![Vec::new(); dim * dim];

        let mut by_pin = HashMap::with_capacity(parcels.len());
        let mut kept_bboxes = Vec::with_capacity(parcels.len());

        for (idx, (parcel, bbox)) in parcels.iter().zip(&bboxes).enumerate() {
            by_pin.insert(parcel.pin.clone(), idx);

            let bbox = match bbox {
                Some(b) => *b,
                None => {
                    // degenerate geometry never matches a point
                    kept_bboxes.push(Rect::new((0.0, 0.0), (0.0, 0.0)));
                    continue;
                }
            };
            kept_bboxes.push(bbox);

            if let Some(extent) = extent {
                let (c0, r0) = cell_of(&extent, dim, bbox.min().x, bbox.min().y);
                let (c1, r1) = cell_of(&extent, dim, bbox.max().x, bbox.max().y);
                for row in r0..=r1 {
                    for col in c0..=c1 {
                        cells[row * dim + col].push(idx);
                    }
                }
            }
        }

        info!(
            "Built parcel index: {} parcels, {}x{} grid",
            parcels.len(),
            dim,
            dim
        );

        ParcelIndex {
            parcels,
            bboxes: kept_bboxes,
            by_pin,
            extent,
            dim,
            cells,
        }
    }

    /// Point-in-polygon lookup (lon, lat). Returns the first parcel whose
    /// geometry contains the point.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&Parcel> {
        let extent = self.extent?;
        if lon < extent.min().x
            || lon > extent.max().x
            || lat < extent.min().y
            || lat > extent.max().y
        {
            return None;
        }

        let (col, row) = cell_of(&extent, self.dim, lon, lat);
        let point = Point::new(lon, lat);

        for &idx in &self.cells[row * self.dim + col] {
            let bbox = &self.bboxes[idx];
            if lon < bbox.min().x
                || lon > bbox.max().x
                || lat < bbox.min().y
                || lat > bbox.max().y
            {
                continue;
            }
            if self.parcels[idx].geometry.contains(&point) {
                return Some(&self.parcels[idx]);
            }
        }

        None
    }

    /// Lookup by PIN
    pub fn get(&self, pin: &str) -> Option<&Parcel> {
        self.by_pin.get(pin).map(|&idx| &self.parcels[idx])
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }
}

fn cell_of(extent: &Rect<f64>, dim: usize, x: f64, y: f64) -> (usize, usize) {
    let width = extent.width().max(f64::EPSILON);
    let height = extent.height().max(f64::EPSILON);

    let col = (((x - extent.min().x) / width) * dim as f64) as usize;
    let row = (((y - extent.min().y) / height) * dim as f64) as usize;

    (col.min(dim - 1), row.min(dim - 1))
}
