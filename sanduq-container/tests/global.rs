use sanduq_container::global;
use sanduq_container::prelude::*;

struct Clock {
    zone: String,
}

#[test]
fn installed_container_serves_the_shortcuts() {
    let container = Container::builder()
        .component(
            Component::named::<Clock>("clock")
                .constructor(Signature::new().value("zone"), |args| {
                    Ok(Clock { zone: args.str(0).unwrap_or("UTC").to_string() })
                })
                .method("zone", Signature::new(), |clock, _| Ok(clock.zone.clone())),
        )
        .build()
        .unwrap();

    let installed = global::install(container).unwrap();
    assert!(global::is_installed());
    assert!(std::ptr::eq(installed, global::app()));

    global::make("clock", args!["Asia/Tashkent"], false).unwrap();
    let zone = global::invoke_method("clock", "zone", vec![], false, vec![]).unwrap();
    assert_eq!(zone.downcast_ref::<String>().map(String::as_str), Some("Asia/Tashkent"));

    let shout = Function::new(Signature::new().inject_id("clock", "clock"), |args| {
        Ok(args.instance::<Clock>(0)?.zone.to_uppercase())
    });
    assert_eq!(global::invoke_function(&shout, vec![]).unwrap(), "ASIA/TASHKENT");

    assert!(matches!(
        global::install(Container::builder().build().unwrap()),
        Err(ContainerError::GlobalAlreadyInstalled)
    ));
}
