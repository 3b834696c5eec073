//! Five metaballs orbiting and blending, re-polygonized every frame.

use bevy::prelude::*;
use bevy_metaballs::{MetaballSurface, MetaballsPlugin};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PanOrbitCameraPlugin,
            MetaballsPlugin::default(),
        ))
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera::default(),
        Transform::from_xyz(2.2, 1.6, 2.2).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            ..default()
        },
        Transform::default().looking_to(Vec3::new(-1.0, -1.0, -0.6), Vec3::Y),
    ));

    commands.spawn((
        MetaballSurface::default(),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.5, 0.25),
            perceptual_roughness: 0.35,
            ..default()
        })),
    ));
}
