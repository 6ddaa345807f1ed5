//! End-to-end synchronization behavior across the public node API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tether_core::{ModelSignal, ModelValue, MultipleValueContext, NodeError, NodeRole};

#[test]
fn second_model_under_a_live_name_is_rejected() {
    let first = ModelValue::create("sync.unique", 95).unwrap();
    let err = ModelValue::create("sync.unique", 5).unwrap_err();
    assert_eq!(err, NodeError::ModelNameTaken("sync.unique".to_string()));

    drop(first);
    let _second = ModelValue::create("sync.unique", 5).expect("name released");
}

#[test]
fn value_and_signal_models_share_the_live_name_set() {
    let _value = ModelValue::create("sync.ns", 1).unwrap();
    assert!(ModelSignal::create("sync.ns").is_err());
}

#[test]
fn nodes_expose_their_identity() {
    let model = ModelValue::create("sync.identity.tube", 0).unwrap();
    let interface = model.interface_node();
    let signal = ModelSignal::create("sync.identity.sig").unwrap();

    assert_eq!(model.tube().role(), NodeRole::Model);
    assert_eq!(model.tube().name(), "sync.identity.tube");
    assert_eq!(interface.tube().role(), NodeRole::Interface);
    assert_eq!(interface.tube().name(), model.name());
    assert_eq!(signal.interface_node().tube().role(), NodeRole::Interface);
}

#[test]
fn interface_write_converges_model_and_siblings_without_self_echo() {
    let model = ModelValue::create("sync.green", 95).unwrap();
    let writer = model.interface_node();
    let observer = model.interface_node();

    let writer_calls = Rc::new(Cell::new(0));
    let observer_calls = Rc::new(Cell::new(0));
    let observer_value = Rc::new(Cell::new(0));

    let _cw = {
        let calls = Rc::clone(&writer_calls);
        writer.connect(move |_| calls.set(calls.get() + 1))
    };
    let _co = {
        let calls = Rc::clone(&observer_calls);
        let value = Rc::clone(&observer_value);
        observer.connect(move |new| {
            calls.set(calls.get() + 1);
            value.set(*new);
        })
    };

    writer.set(200);

    assert_eq!(model.get(), 200);
    assert_eq!(observer_calls.get(), 1);
    assert_eq!(observer_value.get(), 200);
    assert_eq!(writer_calls.get(), 0, "the originator hears no echo");
    assert_eq!(writer.get(), 200, "the originator's cache still converges");
}

#[test]
fn dead_shared_callbacks_are_skipped_and_live_ones_still_fire() {
    let model = ModelValue::create("sync.weak", 0).unwrap();
    let interface = model.interface_node();

    let live_calls = Rc::new(Cell::new(0));
    let live: Rc<dyn Fn(&i32)> = {
        let calls = Rc::clone(&live_calls);
        Rc::new(move |_| calls.set(calls.get() + 1))
    };
    interface.connect_shared(&live);

    let dead_calls = Rc::new(Cell::new(0));
    {
        let short_lived: Rc<dyn Fn(&i32)> = {
            let calls = Rc::clone(&dead_calls);
            Rc::new(move |_| calls.set(calls.get() + 1))
        };
        interface.connect_shared(&short_lived);
    }

    model.set(1);
    assert_eq!(live_calls.get(), 1);
    assert_eq!(dead_calls.get(), 0, "dropped owner silences the callback");

    model.set(2);
    assert_eq!(live_calls.get(), 2);
}

#[test]
fn disconnect_by_identity_takes_effect_for_subsequent_publishes() {
    let model = ModelValue::create("sync.identity", 0).unwrap();
    let interface = model.interface_node();

    let calls = Rc::new(Cell::new(0));
    let shared: Rc<dyn Fn(&i32)> = {
        let calls = Rc::clone(&calls);
        Rc::new(move |_| calls.set(calls.get() + 1))
    };
    interface.connect_shared(&shared);

    model.set(1);
    assert_eq!(calls.get(), 1);

    interface.disconnect(&shared);
    model.set(2);
    assert_eq!(calls.get(), 1);
}

#[test]
fn failed_batch_leaves_no_trace() {
    let a = ModelValue::create("sync.batch.a", 10).unwrap();
    let b = ModelValue::create("sync.batch.b", 20).unwrap();

    let notified = Rc::new(Cell::new(0));
    let ia = a.interface_node();
    let ib = b.interface_node();
    let _ca = {
        let notified = Rc::clone(&notified);
        ia.connect(move |_| notified.set(notified.get() + 1))
    };
    let _cb = {
        let notified = Rc::clone(&notified);
        ib.connect(move |_| notified.set(notified.get() + 1))
    };

    let failing = || -> Result<(), &'static str> {
        let mut ctx = MultipleValueContext::new();
        ctx.set(&a, 1);
        ctx.set(&b, 2);
        Err("validation failed")?;
        ctx.commit();
        Ok(())
    };
    assert!(failing().is_err());

    assert_eq!(a.get(), 10);
    assert_eq!(b.get(), 20);
    assert_eq!(notified.get(), 0, "rollback must not notify");
}

#[test]
fn callbacks_observe_writes_in_order() {
    let model = ModelValue::create("sync.order", 0).unwrap();
    let interface = model.interface_node();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let _c = {
        let seen = Rc::clone(&seen);
        interface.connect(move |value| seen.borrow_mut().push(*value))
    };

    for value in [1, 2, 3] {
        model.set(value);
    }
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
}

#[test]
fn reentrant_set_from_a_callback_does_not_panic() {
    let model = ModelValue::create("sync.reentrant", 0).unwrap();
    let clamper = model.interface_node();
    let observer = model.interface_node();

    // A corrective callback: values above 10 are written back clamped.
    let _connection = {
        let writer = model.interface_node();
        clamper.connect(move |value: &i32| {
            if *value > 10 {
                writer.set(10);
            }
        })
    };

    model.set(25);
    assert_eq!(model.get(), 10, "the correction lands on the model");

    model.set(7);
    assert_eq!(model.get(), 7);
    assert_eq!(observer.get(), 7, "a quiet write converges everyone again");
}

#[test]
fn many_interfaces_fan_out_from_one_model() {
    let model = ModelValue::create("sync.fanout", 0u64).unwrap();
    let interfaces: Vec<_> = (0..16).map(|_| model.interface_node()).collect();

    let total = Rc::new(Cell::new(0u64));
    let connections: Vec<_> = interfaces
        .iter()
        .map(|interface| {
            let total = Rc::clone(&total);
            interface.connect(move |value| total.set(total.get() + *value))
        })
        .collect();

    model.set(3);
    assert_eq!(total.get(), 48);

    drop(connections);
    model.set(5);
    assert_eq!(total.get(), 48);
}
