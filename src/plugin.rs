use bevy::{
    asset::RenderAssetUsages,
    mesh::PrimitiveTopology,
    prelude::*,
};

use crate::{
    field::{Metaballs, ScalarField},
    mesh::TriangleSoup,
    sweep::SurfaceExtractor,
    types::Value,
};

/// System sets for the per-frame metaball pipeline.
///
/// Use these to order your own systems relative to surface extraction:
///
/// ```rust,ignore
/// // Run after geometry is ready but before it's uploaded — ideal for collider generation:
/// app.add_systems(Update, build_collider.after(MetaballsSet::Polygonize)
///                                       .before(MetaballsSet::Upload));
/// ```
///
/// ```text
/// MetaballsSet::Sample  →  MetaballsSet::Polygonize  →  [your systems]  →  MetaballsSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaballsSet {
    /// Refills each surface's scalar field from its animated metaballs.
    Sample,
    /// Sweeps the grid and rebuilds the triangle soup.
    Polygonize,
    /// Uploads the soup into each surface's Bevy [`Mesh3d`].
    Upload,
}

/// An animated metaball isosurface.
///
/// Spawn one of these and the plugin does the rest: the scalar field is
/// refilled, re-polygonized, and re-uploaded every frame. Attach your own
/// material alongside; the plugin only manages the [`Mesh3d`].
#[derive(Component)]
#[require(Transform)]
pub struct MetaballSurface {
    /// Density samples per axis. Fixed once spawned — respawn to change it.
    pub size: usize,
    /// Iso-level threshold the surface is extracted at.
    pub iso_level: Value,
    /// The animated density source.
    pub balls: Metaballs,
}

impl Default for MetaballSurface {
    fn default() -> Self {
        Self {
            size: 32,
            iso_level: 80.0,
            balls: Metaballs::default(),
        }
    }
}

impl MetaballSurface {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Sets the iso-level threshold.
    pub fn with_iso_level(mut self, iso_level: Value) -> Self {
        self.iso_level = iso_level;
        self
    }

    /// Sets the animated density source.
    pub fn with_balls(mut self, balls: Metaballs) -> Self {
        self.balls = balls;
        self
    }
}

/// Per-entity working state: the density grid, the extractor's caches, and
/// the triangle soup. All buffers are allocated once when the surface is
/// added and reused every frame.
///
/// Query this between [`MetaballsSet::Polygonize`] and
/// [`MetaballsSet::Upload`] to read the frame's geometry before it reaches
/// the GPU.
#[derive(Component)]
pub struct SurfaceState {
    pub field: ScalarField,
    pub extractor: SurfaceExtractor,
    pub soup: TriangleSoup,
}

/// Runtime configuration for the metaball pipeline.
///
/// Inserted as a resource by [`MetaballsPlugin`]. Modify it at any time:
///
/// ```rust,ignore
/// fn my_system(mut config: ResMut<MetaballsConfig>) {
///     config.time_scale = 0.0; // freeze the blobs
/// }
/// ```
#[derive(Resource)]
pub struct MetaballsConfig {
    /// Multiplier on elapsed time driving the ball orbits.
    ///
    /// `0.0` freezes the animation (the field is still re-extracted each
    /// frame). Default: `1.0`.
    pub time_scale: Value,
}

impl Default for MetaballsConfig {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

/// Bevy plugin that drives per-frame metaball polygonization.
///
/// Every [`MetaballSurface`] added to the world gets its buffers allocated
/// once, then each frame:
///
/// ```text
/// MetaballSurface added
///   → SurfaceState + empty Mesh3d inserted    (on_surface_add)
/// each frame:
///   → field refilled from the moving balls    (MetaballsSet::Sample)
///   → interior sweep rebuilds the soup        (MetaballsSet::Polygonize)
///   → [your collider/readback systems here]
///   → positions+normals written into Mesh3d   (MetaballsSet::Upload)
/// ```
pub struct MetaballsPlugin {
    /// Initial value for [`MetaballsConfig::time_scale`].
    pub time_scale: Value,
}

impl Default for MetaballsPlugin {
    fn default() -> Self {
        Self {
            time_scale: MetaballsConfig::default().time_scale,
        }
    }
}

impl Plugin for MetaballsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MetaballsConfig {
            time_scale: self.time_scale,
        });

        app.configure_sets(
            Update,
            (
                MetaballsSet::Sample,
                MetaballsSet::Polygonize,
                MetaballsSet::Upload,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                on_surface_add.before(MetaballsSet::Sample),
                sample_fields.in_set(MetaballsSet::Sample),
                polygonize_surfaces.in_set(MetaballsSet::Polygonize),
                upload_meshes.in_set(MetaballsSet::Upload),
            ),
        );
    }
}

/// Allocates working buffers and an empty mesh for each new [`MetaballSurface`].
///
/// A surface whose grid is too small is logged and left untouched.
fn on_surface_add(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<(Entity, &MetaballSurface), (Added<MetaballSurface>, Without<SurfaceState>)>,
) {
    for (entity, surface) in query.iter() {
        let field = match ScalarField::new(surface.size) {
            Ok(field) => field,
            Err(err) => {
                tracing::error!(size = surface.size, "cannot allocate metaball surface: {err}");
                continue;
            }
        };
        let extractor = SurfaceExtractor::new(&field);

        // Attributes are rewritten every frame, so the main-world copy must
        // be kept alongside the render-world one.
        let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());

        tracing::debug!(size = surface.size, iso_level = surface.iso_level, "metaball surface allocated");
        commands.entity(entity).insert((
            SurfaceState {
                field,
                extractor,
                soup: TriangleSoup::new(),
            },
            Mesh3d(meshes.add(mesh)),
        ));
    }
}

/// Refills every surface's density grid from its metaballs at the current
/// animation time.
fn sample_fields(
    time: Res<Time>,
    config: Res<MetaballsConfig>,
    mut query: Query<(&MetaballSurface, &mut SurfaceState)>,
) {
    let t = time.elapsed_secs() * config.time_scale;
    for (surface, mut state) in query.iter_mut() {
        let balls = &surface.balls;
        state.field.refill(|p| balls.density(p, t));
    }
}

/// Rebuilds each surface's triangle soup by sweeping its grid.
fn polygonize_surfaces(mut query: Query<(&MetaballSurface, &mut SurfaceState)>) {
    for (surface, mut state) in query.iter_mut() {
        let SurfaceState {
            field,
            extractor,
            soup,
        } = &mut *state;
        soup.clear();
        if let Err(err) = extractor.extract(field, surface.iso_level, soup) {
            tracing::error!("surface extraction failed: {err}");
        }
    }
}

/// Writes each frame's triangle soup into the surface's [`Mesh3d`].
///
/// Triangle soup is uploaded as a non-indexed triangle list — no index
/// buffer exists by design.
fn upload_meshes(mut meshes: ResMut<Assets<Mesh>>, query: Query<(&SurfaceState, &Mesh3d)>) {
    for (state, mesh3d) in query.iter() {
        let Some(mesh) = meshes.get_mut(&mesh3d.0) else {
            continue;
        };
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, state.soup.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, state.soup.normals.clone());
    }
}
