use std::sync::Arc;

use rinject::{
    Assign, AssignError, Injectable, InjectError, Injector, Member, MemberTable, MissingOptional,
    ServiceRegistry,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Logger {
    prefix: &'static str,
}

#[derive(Injectable, Default)]
struct Hud {
    #[inject]
    logger: Option<Arc<Logger>>,
    #[inject(read_only)]
    cached_logger: Option<Arc<Logger>>,
}

impl Hud {
    fn cached_logger(&self) -> Option<&Arc<Logger>> {
        self.cached_logger.as_ref()
    }
}

#[derive(Injectable, Default)]
struct FrameLimiter {
    #[inject]
    frame_budget: i32,
}

#[derive(Injectable, Default)]
struct Decoration {
    visible: bool,
}

#[derive(Injectable, Default)]
struct Minimap {
    #[inject]
    logger: Option<Arc<Logger>>,
    #[inject]
    zoom: Option<f32>,
}

#[derive(Injectable, Default)]
struct SpawnTimer {
    #[inject(optional)]
    budget: u32,
}

#[test]
fn test_optional_value_kept_until_registered() {
    init_logger();
    let registry = ServiceRegistry::new();

    let mut timer = SpawnTimer { budget: 77 };
    rinject::inject(&registry, &mut timer).unwrap();
    assert_eq!(timer.budget, 77);

    Injector::new(&registry)
        .missing_optional(MissingOptional::Warn)
        .inject(&mut timer)
        .unwrap();
    assert_eq!(timer.budget, 77);

    registry.insert(5u32);
    rinject::inject(&registry, &mut timer).unwrap();
    assert_eq!(timer.budget, 5);
}

#[test]
fn test_no_injectable_members_is_noop() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "hud" });

    let mut decoration = Decoration { visible: true };
    rinject::inject(&registry, &mut decoration).unwrap();
    assert!(decoration.visible);
}

#[test]
fn test_writable_and_read_only_share_instance() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "hud" });

    let mut hud = Hud::default();
    rinject::inject(&registry, &mut hud).unwrap();

    let expected = registry.get::<Logger>().unwrap();
    assert!(Arc::ptr_eq(hud.logger.as_ref().unwrap(), &expected));
    assert!(Arc::ptr_eq(hud.cached_logger().unwrap(), &expected));
    assert_eq!(hud.cached_logger().unwrap().prefix, "hud");
}

#[test]
fn test_missing_required_value_type() {
    init_logger();
    let registry = ServiceRegistry::new();

    let mut limiter = FrameLimiter::default();
    let err = rinject::inject(&registry, &mut limiter).unwrap_err();

    match &err {
        InjectError::MissingService {
            service,
            member,
            target,
        } => {
            assert_eq!(*service, "i32");
            assert_eq!(*member, "frame_budget");
            assert!(target.ends_with("FrameLimiter"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("'i32'"));
    assert_eq!(limiter.frame_budget, 0);
}

#[test]
fn test_missing_optional_keeps_prior_value() {
    init_logger();
    let registry = ServiceRegistry::new();
    let previous = Arc::new(Logger { prefix: "old" });

    let mut minimap = Minimap {
        logger: Some(Arc::clone(&previous)),
        zoom: Some(2.0),
    };
    rinject::inject(&registry, &mut minimap).unwrap();

    assert!(Arc::ptr_eq(minimap.logger.as_ref().unwrap(), &previous));
    assert_eq!(minimap.zoom, Some(2.0));
}

#[test]
fn test_inject_is_idempotent() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "map" });
    registry.insert(1.5f32);

    let mut once = Minimap::default();
    rinject::inject(&registry, &mut once).unwrap();

    let mut twice = Minimap::default();
    rinject::inject(&registry, &mut twice).unwrap();
    rinject::inject(&registry, &mut twice).unwrap();

    assert!(Arc::ptr_eq(once.logger.as_ref().unwrap(), twice.logger.as_ref().unwrap()));
    assert_eq!(once.zoom, twice.zoom);
    assert_eq!(twice.zoom, Some(1.5));
}

#[test]
fn test_deny_missing_optional() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "map" });

    let mut minimap = Minimap::default();
    let err = Injector::new(&registry)
        .missing_optional(MissingOptional::Deny)
        .inject(&mut minimap)
        .unwrap_err();

    assert!(matches!(err, InjectError::MissingService { member: "zoom", .. }));
    assert!(minimap.logger.is_some());
}

#[test]
fn test_read_only_without_storage_fails() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "hud" });

    let table = MemberTable::new()
        .member(Member::shared("logger", |hud: &mut Hud, logger: Arc<Logger>| {
            hud.logger = Some(logger)
        }))
        .member(Member::read_only::<Logger>("cached_logger"));

    let mut hud = Hud::default();
    let err = Injector::new(&registry)
        .inject_with(&table, &mut hud)
        .unwrap_err();

    match err {
        InjectError::InjectionFailure { member, source, .. } => {
            assert_eq!(member, "cached_logger");
            assert_eq!(source, AssignError::NoBackingStorage { member: "cached_logger" });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(hud.logger.is_some());
    assert!(hud.cached_logger().is_none());
}

#[test]
fn test_read_only_storage_type_mismatch() {
    init_logger();
    let registry = ServiceRegistry::new();
    registry.insert(Logger { prefix: "hud" });

    // Storage expects a different service than the member declares
    let table = MemberTable::new().read_only(
        Member::read_only::<Logger>("cached_logger"),
        Assign::shared(|_: &mut Hud, _: Arc<String>| {}),
    );

    let mut hud = Hud::default();
    let err = Injector::new(&registry)
        .inject_with(&table, &mut hud)
        .unwrap_err();
    assert!(matches!(
        err,
        InjectError::InjectionFailure {
            source: AssignError::TypeMismatch { .. },
            ..
        }
    ));
}
