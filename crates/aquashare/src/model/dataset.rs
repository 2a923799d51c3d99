//! Immutable dataset snapshots.
//!
//! Each user action maps the current snapshot to a new one; nothing here
//! mutates in place through a shared handle. UI selection and draw-mode state
//! are not part of the dataset.

use tracing::debug;

use super::entities::{Farmer, MapView, Parcel, Sprinkler, SupplyPoint};
use super::ids::{FarmerId, ParcelId, SprinklerId, SupplyPointId};

/// Name given to farmers added without one.
pub const DEFAULT_FARMER_NAME: &str = "新しい農家";

/// All entities of one invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub map: MapView,
    pub farmers: Vec<Farmer>,
    pub supply_points: Vec<SupplyPoint>,
    pub sprinklers: Vec<Sprinkler>,
    pub parcels: Vec<Parcel>,
}

/// Fresh identifier `<prefix>-<uuid v4>`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

impl Dataset {
    pub fn farmer(&self, id: &FarmerId) -> Option<&Farmer> {
        self.farmers.iter().find(|f| &f.id == id)
    }

    pub fn supply_point(&self, id: &SupplyPointId) -> Option<&SupplyPoint> {
        self.supply_points.iter().find(|s| &s.id == id)
    }

    pub fn sprinkler(&self, id: &SprinklerId) -> Option<&Sprinkler> {
        self.sprinklers.iter().find(|s| &s.id == id)
    }

    pub fn parcel(&self, id: &ParcelId) -> Option<&Parcel> {
        self.parcels.iter().find(|p| &p.id == id)
    }

    /// Empty dataset with the default map view.
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn with_map_view(&self, map: MapView) -> Self {
        Self {
            map,
            ..self.clone()
        }
    }

    /// Append a farmer with a generated id; returns the new snapshot and the id.
    pub fn add_farmer(&self, name: Option<&str>) -> (Self, FarmerId) {
        let id = FarmerId::new(new_id("far"));
        let mut next = self.clone();
        next.farmers.push(Farmer {
            id: id.clone(),
            name: name.unwrap_or(DEFAULT_FARMER_NAME).to_string(),
            notes: None,
        });
        (next, id)
    }

    /// Apply `edit` to the farmer with `id`; unknown ids leave the snapshot unchanged.
    pub fn update_farmer(&self, id: &FarmerId, edit: impl FnOnce(&mut Farmer)) -> Self {
        let mut next = self.clone();
        if let Some(f) = next.farmers.iter_mut().find(|f| &f.id == id) {
            edit(f);
        }
        next
    }

    /// Whether any parcel or recorded supply-point share points at `id`.
    pub fn is_farmer_referenced(&self, id: &FarmerId) -> bool {
        self.parcels.iter().any(|p| p.farmer.as_ref() == Some(id))
            || self
                .supply_points
                .iter()
                .any(|s| s.shares.iter().any(|sh| &sh.farmer_id == id))
    }

    /// Remove a farmer. `None` when the farmer is still referenced.
    pub fn remove_farmer(&self, id: &FarmerId) -> Option<Self> {
        if self.is_farmer_referenced(id) {
            debug!(farmer = %id, "remove_farmer refused: still referenced");
            return None;
        }
        let mut next = self.clone();
        next.farmers.retain(|f| &f.id != id);
        Some(next)
    }

    pub fn upsert_supply_point(&self, sp: SupplyPoint) -> Self {
        let mut next = self.clone();
        upsert(&mut next.supply_points, sp, |s| &s.id);
        next
    }

    /// Remove a supply point and detach every sprinkler that referenced it.
    pub fn remove_supply_point(&self, id: &SupplyPointId) -> Self {
        let mut next = self.clone();
        next.supply_points.retain(|s| &s.id != id);
        for sprinkler in &mut next.sprinklers {
            if sprinkler.supply_point.as_ref() == Some(id) {
                sprinkler.supply_point = None;
            }
        }
        next
    }

    pub fn upsert_sprinkler(&self, sprinkler: Sprinkler) -> Self {
        let mut next = self.clone();
        upsert(&mut next.sprinklers, sprinkler, |s| &s.id);
        next
    }

    pub fn remove_sprinkler(&self, id: &SprinklerId) -> Self {
        let mut next = self.clone();
        next.sprinklers.retain(|s| &s.id != id);
        next
    }

    pub fn upsert_parcel(&self, parcel: Parcel) -> Self {
        let mut next = self.clone();
        upsert(&mut next.parcels, parcel, |p| &p.id);
        next
    }

    pub fn remove_parcel(&self, id: &ParcelId) -> Self {
        let mut next = self.clone();
        next.parcels.retain(|p| &p.id != id);
        next
    }
}

/// Replace the item with the same key in place, or append.
fn upsert<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &K) {
    match items.iter().position(|x| key(x) == key(&item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FarmerShare;
    use geo::{polygon, Point};

    fn farmer(id: &str) -> Farmer {
        Farmer {
            id: FarmerId::from(id),
            name: id.to_uppercase(),
            notes: None,
        }
    }

    fn sample() -> Dataset {
        Dataset {
            farmers: vec![farmer("a"), farmer("b"), farmer("c")],
            supply_points: vec![SupplyPoint {
                id: SupplyPointId::from("f1"),
                name: "F1".into(),
                location: Point::new(0.0, 0.0),
                annual_draw_m3: 100.0,
                shares: vec![FarmerShare {
                    farmer_id: FarmerId::from("b"),
                    share: 1.0,
                    computed: None,
                }],
            }],
            sprinklers: vec![Sprinkler {
                id: SprinklerId::from("s1"),
                name: "S1".into(),
                location: Point::new(0.0, 0.0),
                supply_point: Some(SupplyPointId::from("f1")),
            }],
            parcels: vec![Parcel {
                id: ParcelId::from("p1"),
                name: "P1".into(),
                polygon: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
                farmer: Some(FarmerId::from("a")),
                assessed_area_sqm: Some(10.0),
            }],
            ..Dataset::default()
        }
    }

    #[test]
    fn remove_farmer_guards_references() {
        let ds = sample();
        assert!(ds.remove_farmer(&FarmerId::from("a")).is_none()); // parcel owner
        assert!(ds.remove_farmer(&FarmerId::from("b")).is_none()); // share holder
        let next = ds.remove_farmer(&FarmerId::from("c")).expect("unreferenced");
        assert_eq!(next.farmers.len(), 2);
        // Input snapshot untouched.
        assert_eq!(ds.farmers.len(), 3);
    }

    #[test]
    fn remove_supply_point_detaches_sprinklers() {
        let ds = sample();
        let next = ds.remove_supply_point(&SupplyPointId::from("f1"));
        assert!(next.supply_points.is_empty());
        assert_eq!(next.sprinklers.len(), 1);
        assert!(next.sprinklers[0].supply_point.is_none());
        assert!(ds.sprinklers[0].supply_point.is_some());
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let ds = sample();
        let mut moved = ds.sprinklers[0].clone();
        moved.location = Point::new(5.0, 5.0);
        let next = ds.upsert_sprinkler(moved);
        assert_eq!(next.sprinklers.len(), 1);
        assert_eq!(next.sprinklers[0].location, Point::new(5.0, 5.0));

        let mut other = ds.sprinklers[0].clone();
        other.id = SprinklerId::from("s2");
        let next = next.upsert_sprinkler(other);
        assert_eq!(next.sprinklers.len(), 2);
        let next = next.remove_sprinkler(&SprinklerId::from("s1"));
        assert_eq!(next.sprinklers[0].id.as_str(), "s2");
    }

    #[test]
    fn add_and_update_farmer() {
        let (ds, id) = Dataset::reset().add_farmer(None);
        assert!(id.as_str().starts_with("far-"));
        assert_eq!(ds.farmer(&id).unwrap().name, DEFAULT_FARMER_NAME);
        let ds = ds.update_farmer(&id, |f| f.name = "Higa".into());
        assert_eq!(ds.farmer(&id).unwrap().name, "Higa");
        let (ds2, id2) = ds.add_farmer(Some("Arakaki"));
        assert_ne!(id, id2);
        assert_eq!(ds2.farmers.len(), 2);
    }

    #[test]
    fn reset_restores_default_view() {
        let ds = sample().with_map_view(MapView {
            center: [0.0, 0.0],
            zoom: 3.0,
        });
        assert_eq!(ds.map.zoom, 3.0);
        let fresh = Dataset::reset();
        assert_eq!(fresh.map, MapView::default());
        assert!(fresh.parcels.is_empty());
    }
}
