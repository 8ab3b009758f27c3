//! Marker overlay walkthrough
//!
//! Builds a view manager with two viewports, mounts a provider, lets a few
//! "UI nodes" register pins through the published context, and renders frames
//! as pins are hovered, removed and finally the provider is unmounted.
//!
//! Run with `RUST_LOG=debug cargo run --example marker_overlay` to see the
//! registry and invalidation logging.

use std::rc::Rc;

use anyhow::Result;
use haggis_markers::prelude::*;
use log::info;

/// A UI node owning one pin; unregisters it when dropped.
struct PinNode {
    pin: Rc<PinMarker>,
    id: MarkerId,
    markers: IntegrationContext,
}

impl PinNode {
    fn mount(scope: &ContextScope, label: &str, position: Point3<f32>) -> Result<Self> {
        let markers = marker_context(scope)?;
        let pin = Rc::new(PinMarker::new(position).with_label(label));
        let id = markers.register(pin.clone());
        Ok(Self { pin, id, markers })
    }

    fn hover(&self) {
        self.pin.set_label(Some(format!("{} (hovered)", self.pin.label().unwrap_or_default())));
        self.markers.refresh_position(self.id);
        self.markers.enqueue_view_invalidation();
    }
}

impl Drop for PinNode {
    fn drop(&mut self) {
        self.markers.unregister(self.id);
    }
}

fn render(views: &BasicViewManager, tasks: &TaskQueue, title: &str) {
    tasks.run_pending();
    println!("--- {title} ---");
    let frame = views.render_frame();
    if frame.is_empty() {
        println!("  (no viewport redrawn)");
    }
    for (viewport, graphics) in frame {
        println!("  {:?}: {} marker graphic(s)", viewport, graphics.len());
        for graphic in graphics {
            println!(
                "    {:<20} at ({:>6.1}, {:>6.1})",
                graphic.label.unwrap_or_default(),
                graphic.position.x,
                graphic.position.y
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let views = Rc::new(BasicViewManager::new());
    let main_view = Rc::new(SceneViewport::looking_at(
        ViewportId(0),
        1280.0,
        720.0,
        Point3::new(8.0, -8.0, 6.0),
        Point3::new(0.0, 0.0, 0.0),
    ));
    let minimap = Rc::new(
        SceneViewport::looking_at(
            ViewportId(1),
            256.0,
            256.0,
            Point3::new(0.0, -1.0, 20.0),
            Point3::new(0.0, 0.0, 0.0),
        )
        .without_invalidation(),
    );
    views.add_viewport(main_view.clone());
    views.add_viewport(minimap.clone());

    let tasks = TaskQueue::new();
    let mut provider =
        ViewIntegrationProvider::new(views.clone(), Rc::new(tasks.clone()), ProviderConfig::new());
    provider.mount()?;
    info!("provider state: {:?}", provider.state());

    let scope = ContextScope::new();
    let _published = provider.provide(&scope);

    let panel = scope.child();
    let pump = PinNode::mount(&panel.child(), "Pump house", Point3::new(-2.0, 1.0, 0.0))?;
    let tank = PinNode::mount(&panel.child(), "Tank 3", Point3::new(1.5, -1.0, 0.5))?;
    let valve = PinNode::mount(&panel.child(), "Valve A", Point3::new(0.0, 2.5, 0.0))?;

    render(&views, &tasks, "first frame");

    tank.hover();
    render(&views, &tasks, "after hovering Tank 3");

    drop(valve);
    render(&views, &tasks, "after removing Valve A");

    let stats = provider.context().invalidation().stats();
    info!("invalidation stats: {:?}", stats);

    provider.unmount();
    render(&views, &tasks, "after unmount");

    drop((pump, tank));
    Ok(())
}
