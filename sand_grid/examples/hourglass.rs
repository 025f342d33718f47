//! Text-mode walkthrough of the sand engine: pour, tilt, blow, purge.

use glam::Vec2;
use sand_grid::{PhysicsConfig, Repulsor, SandWorld, Slot};

fn render(world: &SandWorld) {
    let g = world.grid();
    println!("   ┌{}┐", "─".repeat(g.cols()));
    for row in 0..g.rows() as i64 {
        let line: String = (0..g.cols() as i64)
            .map(|col| match g.get(col, row) {
                Slot::Occupied(p) => p.glyph,
                _ => ' ',
            })
            .collect();
        println!("   │{}│", line);
    }
    println!("   └{}┘", "─".repeat(g.cols()));
    println!(
        "   settled {:>4}   airborne {:>4}   bias {:+.2}",
        g.occupied(),
        world.airborne().len(),
        world.gravity_bias(),
    );
}

fn run(world: &mut SandWorld, frames: usize, repulsors: &[Repulsor]) {
    for _ in 0..frames {
        world.step(repulsors);
    }
}

fn main() {
    println!("\n=== Digital Sand Hourglass ===\n");

    let mut world = match SandWorld::with_seed(400, 200, PhysicsConfig::default(), 2024) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("cannot build world: {}", e);
            return;
        }
    };

    // ── 1. Pour a column from the centre ──────────────────────────────────
    println!("1. Pour 60 bursts at the centre");
    for _ in 0..60 {
        world.spawn_burst(Vec2::new(200.0, 20.0), 4);
        run(&mut world, 2, &[]);
    }
    run(&mut world, 80, &[]);
    render(&world);
    println!();

    // ── 2. Tilt to the right ──────────────────────────────────────────────
    println!("2. Tilt right (bias +0.8) for 60 frames");
    world.set_gravity_bias(0.8);
    run(&mut world, 60, &[]);
    render(&world);
    println!();

    // ── 3. Tilt back to the left ──────────────────────────────────────────
    println!("3. Tilt left (bias -0.8) for 60 frames");
    world.set_gravity_bias(-0.8);
    run(&mut world, 60, &[]);
    render(&world);
    println!();

    // ── 4. Open palm over the pile ────────────────────────────────────────
    println!("4. Hold a repulsor over the left slope for 10 frames, then settle");
    world.set_gravity_bias(0.0);
    run(&mut world, 10, &[Repulsor::new(120.0, 190.0)]);
    run(&mut world, 80, &[]);
    render(&world);
    println!();

    // ── 5. Purge ──────────────────────────────────────────────────────────
    let before = world.active_count();
    let removed = world.purge(100);
    println!("5. Purge 100: {} → {} ({} removed)", before, world.active_count(), removed);
    run(&mut world, 20, &[]);
    render(&world);
}
