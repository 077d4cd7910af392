//! Review session over one label file.
//!
//! A [`ReviewSession`] owns the parsed label file, the position within its
//! image list and the shape store of the image currently under review. Every
//! mutation is written through: the current image is folded back into the
//! label file and the whole file is rewritten before the call returns.

mod navigator;

pub use navigator::{Navigation, Navigator};

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ReviewError;
use crate::ir::io_widget::{RenderRequest, WidgetShape};
use crate::ir::{AttributeKey, Display, LabelFile, Native, Rect, Shape, ShapeId};
use crate::review::{self, ErrorCode, VerificationResult};
use crate::scale::{DisplayPolicy, ScaleContext};
use crate::store::{LoadReport, ShapeStore};

/// Settings that stay fixed for the lifetime of a session.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub policy: DisplayPolicy,
    /// Directory holding the images. Defaults to the label file's directory.
    pub image_dir: Option<PathBuf>,
}

/// An image picked by position or by file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSelector {
    /// Zero-based position in the label file.
    Index(usize),
    Name(String),
}

impl ImageSelector {
    /// Resolves the selector to a position.
    ///
    /// # Errors
    /// `ImageIndexOutOfRange` or `ImageNotFound`.
    pub fn resolve(&self, labels: &LabelFile) -> Result<usize, ReviewError> {
        match self {
            ImageSelector::Index(index) if *index < labels.images.len() => Ok(*index),
            ImageSelector::Index(index) => Err(ReviewError::ImageIndexOutOfRange {
                index: *index,
                len: labels.images.len(),
            }),
            ImageSelector::Name(name) => labels
                .position(name)
                .ok_or_else(|| ReviewError::ImageNotFound(name.clone())),
        }
    }
}

impl FromStr for ImageSelector {
    type Err = std::convert::Infallible;

    /// All-digit input is a position, anything else a file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => ImageSelector::Index(index),
            Err(_) => ImageSelector::Name(s.to_string()),
        })
    }
}

/// What happened to a shape returned by the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The id was unknown; the shape was added as Untagged.
    Added(ShapeId),
    /// The shape exists and its label, attributes or geometry changed.
    Updated(ShapeId),
    /// The shape exists and nothing visible changed.
    Unchanged(ShapeId),
}

impl Selection {
    pub fn id(&self) -> ShapeId {
        match *self {
            Selection::Added(id) | Selection::Updated(id) | Selection::Unchanged(id) => id,
        }
    }
}

#[derive(Debug)]
struct CurrentImage {
    store: ShapeStore,
    scale: ScaleContext,
    load_report: LoadReport,
}

/// An open label file with one image under review.
#[derive(Debug)]
pub struct ReviewSession {
    path: PathBuf,
    options: SessionOptions,
    labels: LabelFile,
    navigator: Navigator,
    current: CurrentImage,
}

impl ReviewSession {
    /// Opens a label file and loads its first image.
    ///
    /// # Errors
    /// Parse errors, `EmptyLabelFile`, or failures to determine the first
    /// image's dimensions.
    pub fn open(path: impl AsRef<Path>, options: SessionOptions) -> Result<Self, ReviewError> {
        Self::open_at(path, options, &ImageSelector::Index(0))
    }

    /// Opens a label file and loads the selected image.
    ///
    /// Nothing is written until the first mutation or navigation.
    pub fn open_at(
        path: impl AsRef<Path>,
        options: SessionOptions,
        image: &ImageSelector,
    ) -> Result<Self, ReviewError> {
        let path = path.as_ref().to_path_buf();
        let labels = LabelFile::load(&path)?;
        if labels.images.is_empty() {
            return Err(ReviewError::EmptyLabelFile);
        }
        let index = image.resolve(&labels)?;
        let navigator = Navigator::starting_at(labels.images.len(), index)?;
        let current = load_image(&path, &options, &labels, index)?;
        tracing::info!(path = %path.display(), images = labels.images.len(), "opened label file");

        Ok(Self {
            path,
            options,
            labels,
            navigator,
            current,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn labels(&self) -> &LabelFile {
        &self.labels
    }

    pub fn index(&self) -> usize {
        self.navigator.index()
    }

    pub fn image_count(&self) -> usize {
        self.navigator.len()
    }

    /// Image names prefixed with their position, e.g. `(2/10) 000002.jpg`.
    pub fn image_options(&self) -> Vec<String> {
        let total = self.labels.images.len();
        self.labels
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| format!("({}/{}) {}", i + 1, total, image.name))
            .collect()
    }

    pub fn store(&self) -> &ShapeStore {
        &self.current.store
    }

    pub fn scale(&self) -> &ScaleContext {
        &self.current.scale
    }

    /// What happened while the current image's objects were loaded.
    pub fn load_report(&self) -> &LoadReport {
        &self.current.load_report
    }

    /// The current image's shapes in display coordinates.
    pub fn display_shapes(&self) -> Vec<Shape<Display>> {
        self.current
            .store
            .shapes()
            .iter()
            .map(|shape| self.current.scale.to_display(shape))
            .collect()
    }

    /// Everything the widget needs to draw the current image.
    pub fn render_request(&self) -> RenderRequest {
        RenderRequest::new(
            self.current.store.image_name(),
            self.current.scale.display_width,
            self.current.scale.display_height,
            &self.display_shapes(),
        )
    }

    /// Takes over the shape the widget returned.
    ///
    /// An unknown id means the reviewer drew a new shape: it is mapped back to
    /// native coordinates and added as Untagged. For a known id, label and
    /// attributes are taken over, and geometry only when it differs from the
    /// current display geometry, so that re-selecting a shape never moves it
    /// by the display rounding error.
    pub fn accept_selection(&mut self, selected: &WidgetShape) -> Result<Selection, ReviewError> {
        let draft = selected.to_draft()?;
        let id = selected.shape_id;

        let selection = match self.current.store.get_by_id(id) {
            Err(_) => {
                let native = self.current.scale.draft_to_original(draft);
                Selection::Added(review::add_untagged(&mut self.current.store, native)?)
            }
            Ok(existing) if existing.kind() != draft.geometry.kind() => {
                let kind = draft.geometry.kind();
                tracing::warn!(shape = %id, stored = %existing.kind(), %kind, "widget changed shape kind");
                return Err(ReviewError::MalformedShape {
                    kind,
                    reason: format!("shape {} is stored as a {} shape", id, existing.kind()),
                });
            }
            Ok(existing) => {
                let shown = self.current.scale.to_display(existing);
                let geometry_changed = shown.geometry != draft.geometry;
                if !geometry_changed
                    && shown.label == draft.label
                    && shown.attributes == draft.attributes
                {
                    return Ok(Selection::Unchanged(id));
                }

                let scale = self.current.scale;
                self.current.store.update(id, |shape| {
                    if geometry_changed {
                        shape.geometry = scale.geometry_to_original(&draft.geometry);
                    }
                    shape.label = draft.label;
                    shape.attributes = draft.attributes;
                })?;
                tracing::info!(shape = %id, geometry_changed, "shape updated from widget");
                Selection::Updated(id)
            }
        };

        self.save()?;
        Ok(selection)
    }

    /// Sets a shape's verdict and saves.
    pub fn set_review(
        &mut self,
        id: ShapeId,
        error_code: ErrorCode,
        comment: impl Into<String>,
    ) -> Result<(), ReviewError> {
        review::set_review(&mut self.current.store, id, error_code, comment)?;
        self.save()
    }

    pub fn get_review(&self, id: ShapeId) -> Option<&VerificationResult> {
        review::get_review(&self.current.store, id)
    }

    pub fn is_deletable(&self, id: ShapeId) -> bool {
        review::is_deletable(&self.current.store, id)
    }

    /// Sets or clears one attribute of a shape and saves.
    pub fn set_attribute(
        &mut self,
        id: ShapeId,
        key: AttributeKey,
        value: Option<String>,
    ) -> Result<(), ReviewError> {
        let mut result = Ok(());
        self.current
            .store
            .update(id, |shape| result = shape.set_attribute(key, value))?;
        result?;
        self.save()
    }

    /// Deletes an Untagged shape and saves.
    pub fn delete_shape(&mut self, id: ShapeId) -> Result<(), ReviewError> {
        review::delete_untagged(&mut self.current.store, id)?;
        self.save()
    }

    /// Native crop rectangle for previewing a shape.
    pub fn preview_region(&self, id: ShapeId) -> Result<Option<Rect<Native>>, ReviewError> {
        let shape = self.current.store.get_by_id(id)?;
        Ok(self.current.scale.preview_region(shape))
    }

    /// Saves, then rebuilds the current image from the saved record.
    pub fn refresh(&mut self) -> Result<(), ReviewError> {
        self.save()?;
        self.current = load_image(&self.path, &self.options, &self.labels, self.index())?;
        Ok(())
    }

    /// Saves and moves to the next image.
    pub fn next(&mut self) -> Result<Navigation, ReviewError> {
        let navigation = {
            let (labels, path, current) = (&mut self.labels, &self.path, &self.current);
            self.navigator
                .next(|index| write_back(labels, path, &current.store, index))?
        };
        self.after_navigation(navigation)
    }

    /// Saves and moves to the previous image.
    pub fn previous(&mut self) -> Result<Navigation, ReviewError> {
        let navigation = {
            let (labels, path, current) = (&mut self.labels, &self.path, &self.current);
            self.navigator
                .previous(|index| write_back(labels, path, &current.store, index))?
        };
        self.after_navigation(navigation)
    }

    /// Saves and jumps to an image by position.
    pub fn go_to(&mut self, index: usize) -> Result<Navigation, ReviewError> {
        let navigation = {
            let (labels, path, current) = (&mut self.labels, &self.path, &self.current);
            self.navigator
                .go_to(index, |i| write_back(labels, path, &current.store, i))?
        };
        self.after_navigation(navigation)
    }

    /// Saves and jumps to an image by name.
    ///
    /// # Errors
    /// `ImageNotFound` if no image has this name.
    pub fn go_to_name(&mut self, name: &str) -> Result<Navigation, ReviewError> {
        let index = ImageSelector::Name(name.to_string()).resolve(&self.labels)?;
        self.go_to(index)
    }

    /// Folds the current image back into the label file and rewrites it.
    pub fn save(&mut self) -> Result<(), ReviewError> {
        let index = self.index();
        write_back(&mut self.labels, &self.path, &self.current.store, index)
    }

    /// Loads the image the navigator moved to. If it cannot be loaded, the
    /// navigator goes back so that the index keeps matching the loaded store.
    fn after_navigation(&mut self, navigation: Navigation) -> Result<Navigation, ReviewError> {
        if let Navigation::Moved { to, .. } = navigation {
            match load_image(&self.path, &self.options, &self.labels, to) {
                Ok(current) => self.current = current,
                Err(err) => {
                    self.navigator.revert(navigation);
                    tracing::warn!(index = to, "staying on current image: {}", err);
                    return Err(err);
                }
            }
        }
        Ok(navigation)
    }
}

fn write_back(
    labels: &mut LabelFile,
    path: &Path,
    store: &ShapeStore,
    index: usize,
) -> Result<(), ReviewError> {
    let len = labels.images.len();
    let slot = labels
        .images
        .get_mut(index)
        .ok_or(ReviewError::ImageIndexOutOfRange { index, len })?;
    *slot = store.to_label_format();
    labels.save(path)?;
    tracing::info!(path = %path.display(), image = %store.image_name(), "saved label file");
    Ok(())
}

fn load_image(
    path: &Path,
    options: &SessionOptions,
    labels: &LabelFile,
    index: usize,
) -> Result<CurrentImage, ReviewError> {
    let record = labels
        .images
        .get(index)
        .ok_or(ReviewError::ImageIndexOutOfRange {
            index,
            len: labels.images.len(),
        })?;

    let (store, load_report) = ShapeStore::load(record);
    if !load_report.is_clean() {
        tracing::warn!(
            image = %record.name,
            dropped = load_report.dropped(),
            issues = load_report.issues.len(),
            "image loaded with issues"
        );
    }

    let (width, height) = match record.dimensions() {
        Some(dims) => dims,
        None => {
            let dir = options
                .image_dir
                .clone()
                .or_else(|| path.parent().map(Path::to_path_buf))
                .unwrap_or_default();
            read_image_dimensions(&dir.join(&record.name))?
        }
    };
    let scale = ScaleContext::for_image(width, height, &options.policy)?;

    Ok(CurrentImage {
        store,
        scale,
        load_report,
    })
}

/// Reads width and height from an image header.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), ReviewError> {
    let size = imagesize::size(path).map_err(|source| ReviewError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width = u32::try_from(size.width).map_err(|_| ReviewError::ImageDimensionInvalid {
        path: path.to_path_buf(),
        message: format!("width {} does not fit in u32", size.width),
    })?;
    let height = u32::try_from(size.height).map_err(|_| ReviewError::ImageDimensionInvalid {
        path: path.to_path_buf(),
        message: format!("height {} does not fit in u32", size.height),
    })?;

    Ok((width, height))
}
