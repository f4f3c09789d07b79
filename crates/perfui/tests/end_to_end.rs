//! End-to-end: a host loop driving a timeline and a panel stack.

use perfui::prelude::*;
use perfui::{PerfuiConfig, Rect};
use std::time::Duration;

#[test]
fn configured_host_loop_settles_ranges_and_layout() {
    let mut config = PerfuiConfig::default();
    config.choreographer.fps = 200;
    config.range.fraction = 0.999;
    config.layout.fraction = 0.999;
    assert!(config.validate().is_empty());

    let mut choreographer = Choreographer::with_config(config.to_choreographer_config());
    let timeline = shared(Range::new(0.0, 10.0).with_lerp(config.range_lerp()));
    let panels = shared(AccordionLayout::vertical().with_lerp(config.layout_lerp()));

    let (cpu, memory) = {
        let mut panels = panels.borrow_mut();
        (
            panels.add_region(RegionSpec::new(20, 400, 100)),
            panels.add_region(RegionSpec::new(20, 400, 100)),
        )
    };
    choreographer.register(timeline.clone());
    choreographer.register(panels.clone());

    timeline.borrow_mut().set_target(5.0, 15.0).unwrap();
    panels
        .borrow_mut()
        .set_state(memory, SizingState::Minimize)
        .unwrap();

    choreographer.start().unwrap();
    let mut frames = 0;
    while !(timeline.borrow().is_converged() && !panels.borrow().is_animating()) {
        assert!(frames < 5_000, "host loop never settled");
        if let Some(outcome) = choreographer.pump_blocking(Duration::from_secs(1)) {
            assert!(outcome.is_animated());
            frames += 1;
        }
    }
    choreographer.stop();

    assert_eq!(timeline.borrow().min(), 5.0);
    assert_eq!(timeline.borrow().max(), 15.0);

    let rects = panels.borrow_mut().split(Rect::new(0, 0, 300, 240));
    assert_eq!(rects[0], (cpu, Rect::new(0, 0, 300, 220)));
    assert_eq!(rects[1], (memory, Rect::new(0, 220, 300, 20)));
}

#[test]
fn paused_host_keeps_state_until_resumed() {
    let mut choreographer = Choreographer::new();
    let range = shared(Range::new(0.0, 1.0));
    choreographer.register(range.clone());
    range.borrow_mut().set_max_target(2.0).unwrap();

    choreographer.set_updates_enabled(false);
    for _ in 0..5 {
        assert_eq!(choreographer.step(), TickOutcome::Suspended);
    }
    assert_eq!(range.borrow().max(), 1.0);

    choreographer.set_updates_enabled(true);
    choreographer.step();
    assert!(range.borrow().max() > 1.0);
}
