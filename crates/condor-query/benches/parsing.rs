// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for dump and host-record parsing on pool-sized inputs.

use condor_query::{limit_key, parse_host_records, parse_key_values, usage_key, CapacitySnapshot};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn config_dump(limits: usize) -> String {
    let mut out = String::from("# Configuration from negotiator\n");
    for i in 0..limits {
        out.push_str(&format!("RESOURCE{i}_LIMIT = {}\n", i * 10));
        out.push_str(&format!("NEGOTIATOR_KNOB_{i} = True\n"));
    }
    out
}

fn userprio_long(limits: usize) -> String {
    let mut out = String::from("MyType = \"Accounting\"\n");
    for i in 0..limits {
        out.push_str(&format!("ConcurrencyLimit_resource{i}_sub = {}.000000\n", i));
        out.push_str(&format!("Priority{i} = 500.0\n"));
    }
    out
}

fn status_output(hosts: usize) -> String {
    (0..hosts)
        .map(|i| format!("8 32000 480000000 wn{:04}.example.org\n", i % (hosts / 2).max(1)))
        .collect()
}

fn bench_limit_dump(c: &mut Criterion) {
    let dump = config_dump(500);
    c.bench_function("parse_key_values/limit_dump_500", |b| {
        b.iter(|| parse_key_values(black_box(dump.as_str()).lines(), limit_key))
    });
}

fn bench_usage_dump(c: &mut Criterion) {
    let dump = userprio_long(500);
    c.bench_function("parse_key_values/usage_dump_500", |b| {
        b.iter(|| parse_key_values(black_box(dump.as_str()).lines(), usage_key))
    });
}

fn bench_capacity(c: &mut Criterion) {
    let output = status_output(5000);
    c.bench_function("capacity/aggregate_5000_slots", |b| {
        b.iter(|| CapacitySnapshot::aggregate(&parse_host_records(black_box(&output))))
    });
}

criterion_group!(benches, bench_limit_dump, bench_usage_dump, bench_capacity);
criterion_main!(benches);
