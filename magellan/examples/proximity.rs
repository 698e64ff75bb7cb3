//! Runs a headless proximity search around Vienna and prints what would be drawn.

use std::time::Duration;

use magellan::control::ListEvent;
use magellan::layer::marker_layer::PointOfInterest;
use magellan::magellan_types::cartesian::Size;
use magellan::magellan_types::geo::GeoPoint;
use magellan::render::RecordingCanvas;
use magellan::{MagellanMap, MapOptions};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut map = MagellanMap::new(MapOptions::default(), None);
    map.init(None, None);
    map.set_size(Size::new(800.0, 600.0));

    // Frame a 2 km radius around the center of Vienna.
    let mut transition = map
        .controller_mut()
        .center_on_location(48.2082, 16.3738, 2_000.0, true);

    let outcome = loop {
        map.animate();
        if let Some(outcome) = transition.try_outcome() {
            break outcome;
        }
        std::thread::sleep(Duration::from_millis(16));
    };
    println!("transition completed: {outcome:?}");

    map.update_markers(&[
        PointOfInterest::new(1, 48.2102, 16.3790, "Cafe Central"),
        PointOfInterest::new(2, 48.2038, 16.3688, "Naschmarkt"),
        PointOfInterest::new(3, 48.2049, 16.3778, "Albertina"),
    ]);
    map.handle_list_event(&ListEvent::ItemHovered(2));

    let mut canvas = RecordingCanvas::new();
    map.render(&mut canvas);

    let view = map.controller().view().expect("map is initialized");
    println!(
        "zoom {} around ({:.4}, {:.4})",
        view.zoom(),
        view.center().lat(),
        view.center().lon()
    );
    println!(
        "{} draw calls: {} polygon(s), {} marker(s), {} cluster badge(s)",
        canvas.calls.len(),
        canvas.polygons().len(),
        canvas.markers().len(),
        canvas.clusters().len()
    );
}
