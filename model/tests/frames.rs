use model::{
    derive, evaluate, Accessors, ActiveAlpha, Color, FadePolicy, FrameConfig, Identity,
    PathPoint, Phase, PointSample, Rejection, Segment,
};

struct Entity {
    path: Vec<PathPoint>,
    color: Color,
}

fn accessors() -> Accessors<Entity> {
    Accessors::new(|e: &Entity, _| e.path.clone()).color(|e, _| e.color)
}

fn path(pts: &[(f64, f64, f64)]) -> Vec<PathPoint> {
    pts.iter()
        .map(|(x, y, t)| PathPoint::new(*x, *y, *t))
        .collect()
}

/// (0, 0) at time 0 to (10, 0) at time 10
fn simple_segment() -> Segment {
    let data = vec![Entity {
        path: path(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]),
        color: Color::rgba(10, 20, 30, 200),
    }];
    derive(&data, &accessors()).segment(0)
}

fn at(seg: &Segment, config: FrameConfig) -> PointSample {
    evaluate(seg, &config, &Identity)
}

fn base_alpha() -> f64 {
    200.0 / 255.0
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn segment_counts() {
    for len in 0..6 {
        let data = vec![Entity {
            path: (0..len)
                .map(|i| PathPoint::new(i as f64, 0.0, i as f64))
                .collect(),
            color: Color::BLACK,
        }];
        let attrs = derive(&data, &accessors());
        assert_eq!(attrs.len(), len.saturating_sub(1));
    }

    // Entity-major ordering across every stream
    let data = vec![
        Entity {
            path: path(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (2.0, 0.0, 2.0)]),
            color: Color::rgb(1, 1, 1),
        },
        Entity {
            path: path(&[(5.0, 5.0, 0.0), (6.0, 6.0, 1.0)]),
            color: Color::rgb(2, 2, 2),
        },
    ];
    let attrs = derive(&data, &accessors());
    let summary: Vec<(u32, u8, f64)> = attrs
        .iter()
        .map(|s| (s.picking_index, s.color[0], s.start.x))
        .collect();
    assert_eq!(summary, vec![(0, 1, 0.0), (0, 1, 1.0), (1, 2, 5.0)]);
}

#[test]
fn exit_fade() {
    let seg = simple_segment();

    let sample = at(&seg, FrameConfig::at(5.0));
    assert_eq!(sample.phase, Phase::Active);
    let marker = sample.marker.unwrap();
    assert_eq!([marker.center[0], marker.center[1]], [5.0, 0.0]);

    let sample = at(&seg, FrameConfig::at(-1.0));
    assert_eq!(sample.phase, Phase::Pending);
    assert!(!sample.visible());

    let marker = at(&seg, FrameConfig::at(10.0)).marker.unwrap();
    assert_eq!([marker.center[0], marker.center[1]], [10.0, 0.0]);
    assert!(close(marker.color[3], base_alpha()));

    let sample = at(&seg, FrameConfig::at(15.0));
    assert_eq!(sample.phase, Phase::Completed);
    let marker = sample.marker.unwrap();
    // Never extrapolated past the end
    assert_eq!([marker.center[0], marker.center[1]], [10.0, 0.0]);
    assert!(close(marker.color[3], 0.5 * base_alpha()));

    assert!(!at(&seg, FrameConfig::at(20.0)).visible());
    assert!(!at(&seg, FrameConfig::at(25.0)).visible());
}

#[test]
fn speed_filter() {
    let data = vec![Entity {
        path: path(&[(0.0, 0.0, 0.0), (100.0, 0.0, 1.0)]),
        color: Color::BLACK,
    }];
    let seg = derive(&data, &accessors()).segment(0);
    for time in [-1.0, 0.0, 0.5, 1.0, 1.5, 3.0] {
        let mut config = FrameConfig::at(time);
        config.max_speed = 50.0;
        let sample = at(&seg, config);
        assert_eq!(sample.phase, Phase::Rejected(Rejection::TooFast));
        assert!(!sample.visible());
    }

    // Without a limit, it's drawn normally
    assert!(at(&seg, FrameConfig::at(0.5)).visible());
}

#[test]
fn entry_fade() {
    let seg = simple_segment();
    assert!(seg.is_last_segment);
    let mut config = FrameConfig::at(11.0);
    config.fade_policy = FadePolicy::EntryFade;
    config.fade_in_time = 4.0;

    let marker = at(&seg, config).marker.unwrap();
    assert!(close(marker.color[3], 0.25 * base_alpha()));
    assert_eq!([marker.center[0], marker.center[1]], [10.0, 0.0]);

    config.current_time = 14.0;
    let marker = at(&seg, config).marker.unwrap();
    assert!(close(marker.color[3], base_alpha()));

    // Past the fade-in window
    for time in [14.5, 15.0, 16.0] {
        config.current_time = time;
        let sample = at(&seg, config);
        assert_eq!(sample.phase, Phase::Completed);
        assert!(!sample.visible());
    }

    // Active segments behave the same under either policy
    config.current_time = 5.0;
    let marker = at(&seg, config).marker.unwrap();
    assert!(close(marker.color[3], base_alpha()));
}

#[test]
fn active_alpha_modes() {
    let seg = simple_segment();
    for (mode, expected) in [(ActiveAlpha::Full, 1.0), (ActiveAlpha::Progress, 0.3)] {
        for policy in [FadePolicy::ExitFade, FadePolicy::EntryFade] {
            let mut config = FrameConfig::at(3.0);
            config.active_alpha = mode;
            config.fade_policy = policy;
            let marker = at(&seg, config).marker.unwrap();
            assert!(close(marker.color[3], expected * base_alpha()));
        }
    }
}

#[test]
fn idempotent() {
    let make = || {
        vec![
            Entity {
                path: path(&[(0.0, 0.0, 0.0), (1.5, 2.5, 3.5), (4.0, 4.0, 9.0)]),
                color: Color::rgb(9, 8, 7),
            },
            Entity {
                path: path(&[(3.0, 3.0, 3.0)]),
                color: Color::rgba(1, 2, 3, 4),
            },
            Entity {
                path: path(&[(3.0, 3.0, 3.0), (3.0, 3.0, 3.0)]),
                color: Color::rgba(1, 2, 3, 4),
            },
        ]
    };
    let first = derive(&make(), &accessors());
    let second = derive(&make(), &accessors());
    assert_eq!(first, second);
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert!(!first.as_bytes().is_empty());
}

#[test]
fn color_default() {
    let data = vec![Entity {
        path: path(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0)]),
        color: Color::from_channels(&[10.0, 20.0, 30.0]).unwrap(),
    }];
    assert_eq!(derive(&data, &accessors()).segment(0).color, [10, 20, 30, 255]);
}

#[test]
fn zero_duration() {
    let data = vec![Entity {
        path: path(&[(0.0, 0.0, 5.0), (10.0, 0.0, 5.0)]),
        color: Color::BLACK,
    }];
    let seg = derive(&data, &accessors()).segment(0);
    for time in [-100.0, 0.0, 4.999, 5.0, 5.001, 100.0] {
        for policy in [FadePolicy::ExitFade, FadePolicy::EntryFade] {
            let mut config = FrameConfig::at(time);
            config.fade_policy = policy;
            config.fade_in_time = 1.0;
            let sample = at(&seg, config);
            assert_eq!(sample.phase, Phase::Rejected(Rejection::ZeroDuration));
            assert!(sample.marker.is_none());
        }
    }
}
