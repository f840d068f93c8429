#![forbid(unsafe_code)]
#![cfg(feature = "policy-config")]

//! Integration test: a policy loaded from TOML changes drag-end behavior.

use bsheet_core::{SheetPolicy, TargetHeight};
use bsheet_harness::{FakeModalHost, FixedContent, TestContainer};
use bsheet_widgets::{SheetPhase, SheetTransitioningDelegate};

const POLICY: &str = r#"
[dismiss]
offset_threshold = 150.0
velocity_threshold = 5000.0

[motion]
present_duration = 0
dismiss_duration = 0
snap_duration = 0
"#;

#[test]
fn loaded_thresholds_drive_the_sheet() {
    let policy = SheetPolicy::from_toml_str(POLICY).expect("valid policy");
    let delegate = SheetTransitioningDelegate::new(vec![
        TargetHeight::Fixed(200.0),
        TargetHeight::Fixed(600.0),
    ])
    .start_index(1)
    .policy(policy);
    let host = FakeModalHost::new(delegate, TestContainer::new(400.0, 800.0));

    let presented = host.present(Some(FixedContent::new(0.0).as_view()));
    assert_eq!(presented.completions(), vec![true]);
    let surface = host.surface().expect("presented");

    // 100 is inside the default dismiss area but outside the loaded one.
    surface.drag_changed(500.0);
    surface.drag_ended(3000.0);
    assert_eq!(surface.phase(), SheetPhase::Resting(0));
    assert_eq!(host.dismiss_requests(), 0);

    surface.drag_changed(170.0);
    surface.drag_ended(0.0);
    assert_eq!(surface.phase(), SheetPhase::Hidden);
    assert_eq!(host.dismiss_requests(), 1);
}
