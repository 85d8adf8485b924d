//! Calculator/view walkthrough.
//!
//! A calculator renders results through a `View` trait. The demo swaps in a
//! mocked view, drives the calculator, and verifies what it did.
//!
//! Run with: `cargo run --example calculator`

use std::sync::Arc;
use stand_in::{LogReporter, Method, Mock, Verifier};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

trait View {
    fn display(&self, value: i32) -> bool;
    fn error(&self, message: String) -> bool;
}

struct Calculator<'a> {
    view: &'a dyn View,
}

impl Calculator<'_> {
    fn add(&self, a: i32, b: i32) {
        if !self.view.display(a + b) {
            let _ = self.view.error("could not display result".to_string());
        }
    }
}

struct MockView {
    display: Method<i32, bool>,
    error: Method<String, bool>,
}

impl View for MockView {
    fn display(&self, value: i32) -> bool {
        self.display.invoke(value)
    }

    fn error(&self, message: String) -> bool {
        self.error.invoke(message)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(LevelFilter::DEBUG))
        .init();

    println!("=== Calculator / View Example ===\n");

    let mock = Mock::new("View");
    let view = MockView {
        display: mock.method("display").unwrap(),
        error: mock.method("error").unwrap(),
    };
    let calculator = Calculator { view: &view };

    // Small results fit on the display, anything else is rejected.
    view.display
        .when()
        .matching(|v: &i32| (-99..=99).contains(v))
        .always_return(true);
    view.error.fake();

    println!("Stubs:");
    for line in mock.describe_stubs() {
        println!("  {}", line);
    }

    calculator.add(1, 2);
    calculator.add(50, 60);
    calculator.add(-4, 4);

    println!("\nRecorded calls:");
    for record in mock.history() {
        println!("  #{} {}", record.sequence(), record);
    }

    let verifier = Verifier::with_reporter(Arc::new(LogReporter));
    let checks = [
        verifier.check(view.display.calls().exactly(3)),
        verifier.check(view.error.calls().once()),
        verifier.check(view.display.calls() * 2 + view.error.calls() + view.display.calls()),
        // Fails on purpose: the error follows the second display, not the first.
        verifier.check(view.display.calls() + view.error.calls() + view.display.calls() * 2),
    ];

    println!("\nVerdicts:");
    for verdict in &checks {
        println!("{}\n", verdict);
    }

    let metrics = mock.metrics().snapshot();
    println!(
        "Metrics: {} recorded, {} stubbed, {} defaulted, {} failed",
        metrics.calls_recorded, metrics.calls_stubbed, metrics.calls_defaulted, metrics.calls_failed
    );
}
