//! Story flagging: the first flag on a story emails the administrators and
//! marks it objectionable. Later flags do nothing.

use tracing::info;

use parks_common::{ParksError, Story};
use parks_store::{query, ParkStore};

use crate::notifier::{Mailer, OutgoingMail};

pub const FLAG_SENDER: &str = "support@bostonparks.org";
pub const FLAG_SUBJECT: &str = "Flagged Story on the BostonParks website";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    Flagged,
    AlreadyFlagged,
}

pub fn render_flag_message(story: &Story, site_domain: &str) -> String {
    format!(
        "\nA user of the Boston Parks website has flagged this story as objectionable.\n\
         \n\
         Here is the story:\n\
         {text}\n\
         \n\
         Link to Admin: http://{site_domain}/admin/parks/story/{id}\n",
        text = story.text,
        id = story.id,
    )
}

/// Flag a story by its URL id.
///
/// The check and the update are not atomic; two concurrent first flags can
/// both notify. A delivery failure leaves the story unflagged.
pub async fn flag_story(
    store: &dyn ParkStore,
    mailer: &dyn Mailer,
    site_domain: &str,
    admins: &[String],
    story_id: &str,
) -> Result<FlagOutcome, ParksError> {
    let story = query::story(store, story_id).await?;
    if story.objectionable_content {
        return Ok(FlagOutcome::AlreadyFlagged);
    }

    let mail = OutgoingMail {
        from: FLAG_SENDER.to_string(),
        to: admins.to_vec(),
        subject: FLAG_SUBJECT.to_string(),
        body: render_flag_message(&story, site_domain),
    };
    mailer
        .send(&mail)
        .await
        .map_err(|e| ParksError::Delivery(format!("{e:#}")))?;

    store.set_story_objectionable(story.id).await?;
    info!(story_id = story.id, "Story flagged as objectionable");

    Ok(FlagOutcome::Flagged)
}
