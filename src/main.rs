//! Dovetail entry point
//!
//! The browser build is driven from JavaScript through `dovetail::wasm`.
//! Natively this plays one box and one stool in idle mode and logs the run.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dovetail::consts::FRAME_DT;
    use dovetail::sim::{GameEvent, Phase, Project};
    use dovetail::{Bench, Tuning};

    env_logger::init();
    log::info!("Dovetail (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut bench = match Bench::new(seed, Tuning::default()) {
        Ok(bench) => bench,
        Err(e) => {
            log::error!("Bad tuning: {}", e);
            std::process::exit(1);
        }
    };
    bench.set_idle_mode(true);

    // Stop once the stool is collected and the next box begins
    let mut collected = 0;
    while collected < 2 && bench.state.time_ticks < 60 * 60 * 10 {
        let was = bench.state.phase;
        bench.tick(FRAME_DT);
        for event in bench.take_events() {
            if let GameEvent::PhaseEntered { project, phase } = event {
                log::info!("[{:>6}] {} / {:?}", bench.state.time_ticks, project.label(), phase);
            }
        }
        if was == Phase::Success && bench.state.phase == Phase::Intro {
            collected += 1;
        }
    }

    println!(
        "Crafted {} box(es) and {} stool(s) from {} logs in {:.1}s",
        bench.session.crafted_count(Project::Box),
        bench.session.crafted_count(Project::Stool),
        bench.session.inventory.logs,
        bench.state.time_ticks as f32 * FRAME_DT
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is dovetail::wasm::wasm_main, this is just to satisfy the compiler
}
