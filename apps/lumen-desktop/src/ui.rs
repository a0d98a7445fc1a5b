//! The "Debug" window.

use crate::state::AppState;
use egui::{Context, DragValue, Slider, Ui};
use glam::Vec3;
use lumen_render::MAX_SSAO_SAMPLES;
use lumen_scene::{LightKind, MAX_LIGHTS};

const BRDF_PREVIEW_SIZE: f32 = 128.0;

pub fn draw(ctx: &Context, state: &mut AppState, brdf_lut: egui::TextureId) {
    if !state.show_ui {
        return;
    }
    egui::Window::new("Debug")
        .default_width(320.0)
        .vscroll(true)
        .show(ctx, |ui| {
            ui.collapsing("Program Stats", |ui| stats(ui, state));
            ui.collapsing("Camera", |ui| camera(ui, state));
            ui.collapsing("Lights", |ui| lights(ui, state));
            ui.collapsing("Entities", |ui| entities(ui, state));
            ui.collapsing("SSAO", |ui| ssao(ui, state));
            ui.collapsing("IBL", |ui| ibl(ui, state, brdf_lut));
            ui.collapsing("Controls", controls);
        });
}

fn stats(ui: &mut Ui, state: &AppState) {
    ui.label(format!("FPS: {:.1}", state.fps.fps()));
    ui.label(format!("Size: {} x {}", state.size.0, state.size.1));
    ui.label(format!("Draw calls: {}", state.stats.draw_calls));
    ui.label(format!(
        "Passes: {}  Transitions: {}",
        state.stats.passes, state.stats.transitions
    ));
    ui.label(format!("Constant bytes: {}", state.stats.constant_bytes));
}

fn camera(ui: &mut Ui, state: &mut AppState) {
    let cam = &mut state.camera;
    ui.horizontal(|ui| {
        ui.label("Position");
        vec3_drag(ui, &mut cam.position, 0.1);
    });
    ui.label(format!(
        "Yaw: {:.1}  Pitch: {:.1}",
        cam.yaw.to_degrees(),
        cam.pitch.to_degrees()
    ));
    ui.add(Slider::new(&mut cam.speed, 0.5..=20.0).text("speed"));
    ui.add(Slider::new(&mut state.spin_speed, -2.0..=2.0).text("entity spin"));
}

fn lights(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.settings.draw_light_gizmos, "Draw point lights");

    let mut count = state.scene.lights().len();
    if ui
        .add(Slider::new(&mut count, 0..=MAX_LIGHTS).text("count"))
        .changed()
    {
        state.scene.set_light_count(count);
    }

    for (i, light) in state.scene.lights_mut().iter_mut().enumerate() {
        ui.collapsing(format!("Light {i} ({})", light.kind.label()), |ui| {
            ui.horizontal(|ui| {
                for kind in LightKind::ALL {
                    ui.radio_value(&mut light.kind, kind, kind.label());
                }
            });
            if light.kind.is_local() {
                ui.horizontal(|ui| {
                    ui.label("Position");
                    vec3_drag(ui, &mut light.position, 0.1);
                });
                ui.add(Slider::new(&mut light.range, 0.1..=100.0).text("range"));
            }
            if light.kind != LightKind::Point {
                ui.horizontal(|ui| {
                    ui.label("Direction");
                    if vec3_drag(ui, &mut light.direction, 0.01) {
                        let unit = light.direction.normalize_or_zero();
                        light.direction = if unit == Vec3::ZERO { Vec3::NEG_Y } else { unit };
                    }
                });
            }
            if light.kind == LightKind::Spot {
                ui.add(Slider::new(&mut light.spot_falloff, 0.1..=128.0).text("falloff"));
            }
            ui.horizontal(|ui| {
                ui.label("Color");
                let mut color = light.color.to_array();
                if ui.color_edit_button_rgb(&mut color).changed() {
                    light.color = Vec3::from_array(color);
                }
            });
            ui.add(Slider::new(&mut light.intensity, 0.1..=10.0).text("intensity"));
        });
    }
}

fn entities(ui: &mut Ui, state: &mut AppState) {
    for entity in state.scene.entities_mut() {
        ui.collapsing(entity.name.clone(), |ui| {
            let transform = &mut entity.transform;
            ui.horizontal(|ui| {
                ui.label("Position");
                vec3_drag(ui, &mut transform.position, 0.1);
            });

            let mut angles = transform.pitch_yaw_roll().to_array().map(f32::to_degrees);
            let mut changed = false;
            ui.horizontal(|ui| {
                ui.label("Rotation");
                for (angle, prefix) in angles.iter_mut().zip(["pitch ", "yaw ", "roll "]) {
                    changed |= ui
                        .add(DragValue::new(angle).speed(1.0).prefix(prefix).suffix("°"))
                        .changed();
                }
            });
            if changed {
                transform.set_pitch_yaw_roll(Vec3::from_array(angles.map(f32::to_radians)));
            }

            ui.horizontal(|ui| {
                ui.label("Scale");
                vec3_drag(ui, &mut transform.scale, 0.01);
            });
        });
    }
}

fn ssao(ui: &mut Ui, state: &mut AppState) {
    let ssao = &mut state.settings.ssao;
    ui.checkbox(&mut ssao.enabled, "Enabled (F2)");
    ui.add_enabled_ui(ssao.enabled, |ui| {
        ui.checkbox(&mut ssao.blur, "Blur");
        ui.add(Slider::new(&mut ssao.radius, 0.05..=2.0).text("radius"));
        ui.add(Slider::new(&mut ssao.sample_count, 1..=MAX_SSAO_SAMPLES as u32).text("samples"));
        ui.add(Slider::new(&mut ssao.intensity, 0.1..=4.0).text("intensity"));
        ui.checkbox(&mut ssao.output_only, "AO only");
    });
}

fn ibl(ui: &mut Ui, state: &mut AppState, brdf_lut: egui::TextureId) {
    ui.checkbox(&mut state.settings.indirect_lighting, "Indirect lighting");
    ui.label("BRDF LUT");
    ui.image((brdf_lut, egui::vec2(BRDF_PREVIEW_SIZE, BRDF_PREVIEW_SIZE)));
}

fn controls(ui: &mut Ui) {
    ui.label("WASD: move  Space/X: up/down");
    ui.label("Shift: fast  Ctrl: slow");
    ui.label("Left drag: look");
    ui.label("Tab: randomize lights  F2: SSAO");
    ui.label("F1: toggle UI  Esc: quit");
    ui.separator();
    ui.label("Top: PBR / Bottom: non-PBR");
}

/// Three drag fields for a vector. Returns true if any changed.
fn vec3_drag(ui: &mut Ui, v: &mut Vec3, speed: f64) -> bool {
    let mut changed = false;
    for (value, prefix) in [&mut v.x, &mut v.y, &mut v.z].into_iter().zip(["x: ", "y: ", "z: "]) {
        changed |= ui
            .add(DragValue::new(value).speed(speed).prefix(prefix))
            .changed();
    }
    changed
}
