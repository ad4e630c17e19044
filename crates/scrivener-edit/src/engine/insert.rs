//! Line insertions.

use tracing::info_span;

use super::{ENGINE_TARGET, EditEngine, EditState, finish, transition};
use crate::error::EditError;
use crate::operation::InsertTextRequest;
use crate::schedule::{apply_insertions, apply_insertions_in_sequence};
use crate::validate::validate_insertions;

impl EditEngine<'_> {
    /// Inserts text before or after existing lines.
    ///
    /// With `adjust_line_numbers` every anchor refers to the file as read;
    /// without it, each anchor refers to the file as left by the insertions
    /// before it. All anchors are checked before the backup and the write.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ValidationError::InvalidInsertion`] (wrapped in
    /// [`EditError::Validation`]) for an anchor outside the file, and the usual
    /// policy and I/O errors.
    pub fn insert_text(&self, request: &InsertTextRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: ENGINE_TARGET,
            "insert_text",
            file = %request.path.display(),
            insertions = request.insertions.len(),
            adjust_line_numbers = request.adjust_line_numbers,
        );
        let _entered = span.enter();
        finish(self.run_insert_text(request))
    }

    fn run_insert_text(&self, request: &InsertTextRequest) -> Result<String, EditError> {
        let document = self.open(&request.path)?;

        transition(EditState::Validating);
        let edited = if request.adjust_line_numbers {
            validate_insertions(&document.buffer, &request.insertions)
                .and_then(|()| apply_insertions(&document.buffer, &request.insertions))
        } else {
            apply_insertions_in_sequence(&document.buffer, &request.insertions)
        }
        .map_err(|source| document.validation(source))?;

        if request.insertions.is_empty() {
            return Ok(inserted_message(0, request));
        }
        if request.create_backup {
            self.backup(&document)?;
        }
        self.write(&document, &edited)?;
        Ok(inserted_message(request.insertions.len(), request))
    }
}

fn inserted_message(count: usize, request: &InsertTextRequest) -> String {
    format!("Applied {count} insertions to {}", request.path.display())
}
