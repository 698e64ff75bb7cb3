//! Greedy clustering of markers by screen distance.

use magellan_types::cartesian::Point2;

use super::{Cluster, ClusterId, Marker, PlaceId};
use crate::view::{mercator, mercator_inverse, world_meters_per_pixel};

struct ClusterBuilder {
    seed: Point2,
    sum: Point2,
    members: Vec<PlaceId>,
}

/// Groups markers into clusters for the given zoom level.
///
/// Each marker joins the first cluster whose seed (the position of its first member) lies
/// within `max_radius_px` screen pixels, or starts a new cluster. The badge is placed at the
/// mean of the member positions in projected coordinates. The result depends only on the
/// marker order, zoom and radius, so repeated builds for the same inputs produce the same
/// cluster ids.
pub(super) fn build_clusters(
    markers: &[Marker],
    zoom: u32,
    max_radius_px: f64,
) -> Vec<Cluster> {
    let scale = world_meters_per_pixel(zoom as f64);
    let max_distance_sq = (max_radius_px * scale).powi(2);

    let mut builders: Vec<ClusterBuilder> = vec![];
    for marker in markers {
        let world = mercator(&marker.position());
        match builders
            .iter_mut()
            .find(|builder| builder.seed.distance_sq(&world) <= max_distance_sq)
        {
            Some(builder) => {
                builder.sum.x += world.x;
                builder.sum.y += world.y;
                builder.members.push(marker.id());
            }
            None => builders.push(ClusterBuilder {
                seed: world,
                sum: world,
                members: vec![marker.id()],
            }),
        }
    }

    builders
        .into_iter()
        .enumerate()
        .map(|(index, builder)| {
            let count = builder.members.len() as f64;
            Cluster {
                id: ClusterId(index as u32),
                position: mercator_inverse(Point2::new(
                    builder.sum.x / count,
                    builder.sum.y / count,
                )),
                members: builder.members,
                highlighted: false,
                spiderfied: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use magellan_types::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};

    use super::*;

    fn marker(id: PlaceId, lat: f64, lon: f64) -> Marker {
        Marker {
            id,
            position: GeoPoint2d::latlon(lat, lon),
            title: String::new(),
            highlighted: false,
        }
    }

    #[test]
    fn nearby_markers_cluster_together() {
        let markers = [
            marker(1, 48.2000, 16.4000),
            marker(2, 48.2010, 16.4010),
            marker(3, -33.9, 151.2),
        ];

        let clusters = build_clusters(&markers, 5, 80.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members(), &[1, 2]);
        assert_eq!(clusters[1].members(), &[3]);
    }

    #[test]
    fn higher_zoom_splits_clusters() {
        let markers = [marker(1, 48.20, 16.40), marker(2, 48.25, 16.45)];

        let low_zoom = build_clusters(&markers, 4, 80.0);
        assert_eq!(low_zoom.len(), 1);

        let high_zoom = build_clusters(&markers, 12, 80.0);
        assert_eq!(high_zoom.len(), 2);
    }

    #[test]
    fn badge_sits_between_members() {
        let markers = [marker(1, 48.20, 16.40), marker(2, 48.21, 16.42)];
        let clusters = build_clusters(&markers, 4, 80.0);
        assert_eq!(clusters.len(), 1);

        let position = clusters[0].position();
        assert!(position.lat() > 48.20 && position.lat() < 48.21);
        assert!(position.lon() > 16.40 && position.lon() < 16.42);
    }

    #[test]
    fn empty_input_produces_no_clusters() {
        assert!(build_clusters(&[], 5, 80.0).is_empty());
    }
}
