//! Benchmark: creation-op throughput across kernel thread counts.

use kiln_core::prelude::*;
use std::time::Instant;

fn bench<F: FnMut()>(iters: usize, mut f: F) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn gbps(numel: usize, elem_bytes: usize, secs: f64) -> f64 {
    (numel * elem_bytes) as f64 / secs / 1e9
}

fn main() {
    let rt = Runtime::new(RuntimeConfig::from_env().with_seed(0));
    println!("=== Kiln Creation Benchmark ===");
    println!("threads: {}\n", rt.num_threads());

    let sizes: &[usize] = &[64, 256, 1024, 2048];

    println!("{:<12} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "Size", "zeros (ms)", "full (ms)", "rand (ms)", "randn (ms)", "zeros GB/s");
    println!("{}", "-".repeat(74));

    for &n in sizes {
        let iters = if n <= 256 { 200 } else if n <= 1024 { 20 } else { 5 };

        let zeros_s = bench(iters, || {
            let _ = zeros(&rt, [n, n]).build().unwrap();
        });
        let full_s = bench(iters, || {
            let _ = full(&rt, [n, n], 0.5).build().unwrap();
        });
        let rand_s = bench(iters, || {
            let _ = rand(&rt, [n, n]).build().unwrap();
        });
        let randn_s = bench(iters, || {
            let _ = randn(&rt, [n, n]).build().unwrap();
        });

        println!("{:<12} {:>10.3}ms {:>10.3}ms {:>10.3}ms {:>10.3}ms {:>10.2}",
            format!("{}x{}", n, n),
            zeros_s * 1000.0,
            full_s * 1000.0,
            rand_s * 1000.0,
            randn_s * 1000.0,
            gbps(n * n, 4, zeros_s),
        );
    }

    // Thread scaling
    println!("\n=== Thread Scaling (ones 2048x2048 f64) ===\n");
    println!("{:<10} {:>12} {:>10}", "Threads", "Time (ms)", "Speedup");
    println!("{}", "-".repeat(34));

    let mut baseline = None;
    for threads in [1, 2, 4, 8] {
        set_num_threads(&rt, threads).unwrap();
        let secs = bench(10, || {
            let _ = ones(&rt, [2048, 2048]).dtype::<f64>().build().unwrap();
        });
        let base = *baseline.get_or_insert(secs);
        println!("{:<10} {:>10.3}ms {:>9.1}x", threads, secs * 1000.0, base / secs);
    }

    println!("\nlive allocations after run: {}", rt.live_allocations());
}
