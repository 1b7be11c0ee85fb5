//! The pipeline context the host keeps for the lifetime of the app.
//!
//! A [`Pipeline`] bundles a backend, a validated config, and a dedicated
//! rayon pool for tile encoding. It holds no per-run state: every call gets
//! its own raster and tile sequence, so overlapping uploads never share
//! mutable data and no locking is needed.
//!
//! ```text
//! plan  (sync)  →  resample (async)  →  tile (sync)  →  build_archive (async)
//! ```

use crate::archive;
use crate::config::{ConfigError, PipelineConfig, effective_threads};
use crate::error::Result;
use crate::imaging::{ImageBackend, RustBackend, plan_geometry};
use crate::output::format_geometry;
use crate::resample;
use crate::tile;
use crate::types::{ArchiveBlob, AspectMode, Geometry, LayoutSpec, RasterImage, TileSequence};
use crate::upload::SourceImage;
use std::sync::Arc;
use tracing::info;

pub struct Pipeline<B: ?Sized = RustBackend> {
    config: PipelineConfig,
    pool: Arc<rayon::ThreadPool>,
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for Pipeline<B> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            pool: Arc::clone(&self.pool),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl Pipeline<RustBackend> {
    /// Pipeline on the pure-Rust backend.
    pub fn new(config: PipelineConfig) -> std::result::Result<Self, ConfigError> {
        Self::with_backend(Arc::new(RustBackend::new()), config)
    }
}

impl<B: ImageBackend + ?Sized + 'static> Pipeline<B> {
    pub fn with_backend(
        backend: Arc<B>,
        config: PipelineConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let threads = effective_threads(&config.processing);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("gridcut-encode-{i}"))
            .build()?;
        Ok(Self {
            config,
            pool: Arc::new(pool),
            backend,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Accept an upload through the format gate, using this pipeline's backend.
    pub fn accept_upload(
        &self,
        bytes: impl Into<Arc<[u8]>>,
        media_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<SourceImage> {
        SourceImage::from_upload(self.backend.as_ref(), bytes, media_type, file_name)
            .map(|(source, _)| source)
    }

    /// Dimension planner. Pure; computed fresh on every call.
    pub fn plan(&self, layout: LayoutSpec, aspect: AspectMode) -> Geometry {
        plan_geometry(layout, aspect)
    }

    /// Resample `source` onto `geometry`.
    pub async fn resample(&self, source: SourceImage, geometry: Geometry) -> Result<RasterImage> {
        resample::resample(
            Arc::clone(&self.backend),
            source,
            geometry,
            self.config.resample_options(),
        )
        .await
    }

    /// Cut the raster into encoded tiles on this pipeline's encoder pool.
    pub fn tile(&self, raster: &RasterImage, geometry: &Geometry) -> Result<TileSequence> {
        let backend = self.backend.as_ref();
        let quality = self.config.quality();
        self.pool
            .install(|| tile::tile(backend, raster, geometry, quality))
    }

    /// Zip the tiles under `1.jpg`, `2.jpg`, ...
    pub async fn build_archive(&self, tiles: &TileSequence) -> Result<ArchiveBlob> {
        archive::build_archive(tiles, &self.config.archive_options()).await
    }

    /// Plan, resample, and tile in one call.
    ///
    /// The raster is dropped as soon as tiling finishes.
    pub async fn process(
        &self,
        source: SourceImage,
        layout: LayoutSpec,
        aspect: AspectMode,
    ) -> Result<TileSequence> {
        let geometry = self.plan(layout, aspect);
        info!(
            %layout,
            %aspect,
            geometry = %format_geometry(&geometry),
            "processing upload"
        );
        let raster = self.resample(source, geometry).await?;
        let tiles = self.tile(&raster, &geometry)?;
        drop(raster);
        info!(pieces = tiles.len(), "upload split into tiles");
        Ok(tiles)
    }

    /// [`process`](Self::process) using the configured default selection.
    pub async fn process_default(&self, source: SourceImage) -> Result<TileSequence> {
        let selection = self.config.selection;
        self.process(source, selection.layout, selection.aspect).await
    }

    /// Build the download: the archive blob, which carries the suggested file
    /// name from the config.
    pub async fn download(&self, tiles: &TileSequence) -> Result<ArchiveBlob> {
        self.build_archive(tiles).await
    }
}
