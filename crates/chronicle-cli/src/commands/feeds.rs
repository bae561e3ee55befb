use common::{operations::feeds, templates::optional_field, RenderError, Template};
use serde_json::Value;

use super::{items, no_args, no_params, read_json, resource_id, Ask, Built, Input, Leaf};
use crate::CliError;

const FEED_ID: Ask = Ask::new("feed_id", "Enter Feed ID: ", "Feed ID", "feed ID");
const FEED_FILE: Ask =
    Ask::new("feed_file", "Enter path of feed JSON file: ", "Feed file", "feed file path");

pub const LEAVES: &[Leaf] = &[
    Leaf {
        group: "feeds",
        name: "create",
        about: "Creates a new feed",
        operation: &feeds::CREATE,
        prompts: &[FEED_FILE],
        status: "Creating feed...",
        action: "creating feed",
        args: no_args,
        build: create,
        render: created,
    },
    Leaf {
        group: "feeds",
        name: "delete",
        about: "Delete a feed",
        operation: &feeds::DELETE,
        prompts: &[FEED_ID],
        status: "Deleting feed...",
        action: "deleting feed",
        args: no_args,
        build: by_feed_id,
        render: deleted,
    },
    Leaf {
        group: "feeds",
        name: "disable",
        about: "Disable a feed with a given feed ID",
        operation: &feeds::DISABLE,
        prompts: &[FEED_ID],
        status: "Disabling feed...",
        action: "disabling feed",
        args: no_args,
        build: by_feed_id,
        render: disabled,
    },
    Leaf {
        group: "feeds",
        name: "enable",
        about: "Enable a feed with a given feed ID",
        operation: &feeds::ENABLE,
        prompts: &[FEED_ID],
        status: "Enabling feed...",
        action: "enabling feed",
        args: no_args,
        build: by_feed_id,
        render: enabled,
    },
    Leaf {
        group: "feeds",
        name: "get",
        about: "Get feed details using Feed ID",
        operation: &feeds::GET,
        prompts: &[FEED_ID],
        status: "Fetching feed...",
        action: "fetching feed",
        args: no_args,
        build: by_feed_id,
        render: get,
    },
    Leaf {
        group: "feeds",
        name: "list",
        about: "List all feeds",
        operation: &feeds::LIST,
        prompts: &[],
        status: "Fetching list of feeds...",
        action: "fetching list of feeds",
        args: no_args,
        build: no_params,
        render: list,
    },
    Leaf {
        group: "feeds",
        name: "update",
        about: "Update feed details",
        operation: &feeds::UPDATE,
        prompts: &[FEED_ID, FEED_FILE],
        status: "Updating feed...",
        action: "updating feed",
        args: no_args,
        build: update,
        render: updated,
    },
];

fn by_feed_id(input: &Input) -> Result<Built, CliError> {
    Ok(Built::with_params([("feed_id", input.answer("feed_id")?)]))
}

fn create(input: &Input) -> Result<Built, CliError> {
    Ok(Built::default().body(read_json(input.answer("feed_file")?)?))
}

fn update(input: &Input) -> Result<Built, CliError> {
    Ok(by_feed_id(input)?.body(read_json(input.answer("feed_file")?)?))
}

fn details(feed: &Value) -> Result<Template, RenderError> {
    let details = feed.get("details").unwrap_or(&Value::Null);
    Ok(Template::FeedDetails {
        feed_id: resource_id(feed, "feeds")?,
        display_name: optional_field(feed, "displayName"),
        source_type: optional_field(details, "feedSourceType"),
        log_type: optional_field(details, "logType"),
        state: optional_field(feed, "feedState"),
    })
}

fn feed_id(input: &Input) -> Result<String, CliError> {
    Ok(input.answer("feed_id")?.to_owned())
}

fn created(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::FeedCreated { feed_id: resource_id(body, "feeds")? }])
}

fn deleted(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::FeedDeleted { feed_id: feed_id(input)? }])
}

fn disabled(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::FeedDisabled { feed_id: feed_id(input)? }])
}

fn enabled(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::FeedEnabled { feed_id: feed_id(input)? }])
}

fn get(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![details(body)?])
}

fn list(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    match items(body, "feeds") {
        [] => Ok(vec![Template::NoFeeds {}]),
        feeds => Ok(feeds.iter().map(details).collect::<Result<Vec<_>, RenderError>>()?),
    }
}

fn updated(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::FeedUpdated { feed_id: feed_id(input)? }])
}
