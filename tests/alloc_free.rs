//! Allocation-free render path tests.
//!
//! These verify that `Renderer::render()` does not allocate once the
//! renderer exists. Each demo song is rendered for several seconds so row
//! changes, instrument sequences and wave uploads are all exercised.
//!
//! Just run `cargo test`, no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use gbt_master::{demo, Module, Renderer};

/// Render `module` for `seconds` at 44.1 kHz, aborting on any heap allocation.
fn assert_render_alloc_free(module: &Module, seconds: usize) {
    let mut renderer = Renderer::new(module, 44100, 0, 0);
    let mut block = vec![0.0f32; 512];
    let blocks = 44100 * seconds / 256;

    assert_no_alloc(|| {
        for _ in 0..blocks {
            if !renderer.render(&mut block) {
                break;
            }
        }
    });
}

fn demo_song(name: &str) -> Module {
    demo::build(name).unwrap()
}

#[test]
fn chiptune_alloc_free() {
    assert_render_alloc_free(&demo_song("chiptune"), 5);
}

#[test]
fn slides_alloc_free() {
    assert_render_alloc_free(&demo_song("slides"), 5);
}

#[test]
fn drums_alloc_free() {
    assert_render_alloc_free(&demo_song("drums"), 5);
}

#[test]
fn lock_and_unlock_alloc_free() {
    let module = demo_song("chiptune");
    let mut renderer = Renderer::new(&module, 44100, 0, 0);
    let mut block = vec![0.0f32; 512];

    assert_no_alloc(|| {
        for i in 0..200 {
            renderer.render(&mut block);
            match i % 50 {
                10 => renderer.unlock(gbt_master::ChType::Ch3),
                30 => renderer.lock(gbt_master::ChType::Ch3),
                _ => {}
            }
        }
    });
}
