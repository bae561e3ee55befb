//! The catalogue of server endpoints, one module per command group.

use crate::endpoint::{Method, Operation, QueryParam};

const TIME_RANGE: &[QueryParam] = &[
    QueryParam::required("log_type"),
    QueryParam::required("start_time"),
    QueryParam::required("end_time"),
];

pub mod parsers {
    use super::*;

    pub const LIST: Operation = Operation {
        name: "list",
        method: Method::Get,
        path: "/v1/tools/cbnParsers",
        path_params: &[],
        query: &[],
    };

    pub const LIST_ERRORS: Operation = Operation {
        name: "list_errors",
        method: Method::Get,
        path: "/v1/tools/cbnParsers:listCbnParserErrors",
        path_params: &[],
        query: TIME_RANGE,
    };

    pub const RUN: Operation = Operation {
        name: "run",
        method: Method::Post,
        path: "/v1/tools:validateCbnParser",
        path_params: &[],
        query: &[],
    };

    pub const HISTORY: Operation = Operation {
        name: "history",
        method: Method::Get,
        path: "/v1/tools/cbnParsers:listCbnParserHistory",
        path_params: &[],
        query: &[QueryParam::required("log_type")],
    };

    pub const ARCHIVE: Operation = Operation {
        name: "archive",
        method: Method::Post,
        path: "/v1/tools/cbnParsers/{config_id}:archive",
        path_params: &["config_id"],
        query: &[],
    };

    pub const DOWNLOAD: Operation = Operation {
        name: "download",
        method: Method::Get,
        path: "/v1/tools/cbnParsers/{config_id}",
        path_params: &["config_id"],
        query: &[],
    };

    pub const GENERATE: Operation = Operation {
        name: "generate",
        method: Method::Get,
        path: "/v1/tools/cbnParsers:retrieveSampleLogs",
        path_params: &[],
        query: TIME_RANGE,
    };

    pub const STATUS: Operation = Operation {
        name: "status",
        method: Method::Get,
        path: "/v1/tools/cbnParsers/{config_id}",
        path_params: &["config_id"],
        query: &[],
    };

    pub const SUBMIT: Operation = Operation {
        name: "submit",
        method: Method::Post,
        path: "/v1/tools/cbnParsers",
        path_params: &[],
        query: &[],
    };
}

pub mod feeds {
    use super::*;

    pub const LIST: Operation = Operation {
        name: "list_feeds",
        method: Method::Get,
        path: "/v1/feeds",
        path_params: &[],
        query: &[],
    };

    pub const GET: Operation = Operation {
        name: "get_feed",
        method: Method::Get,
        path: "/v1/feeds/{feed_id}",
        path_params: &["feed_id"],
        query: &[],
    };

    pub const CREATE: Operation = Operation {
        name: "create_feed",
        method: Method::Post,
        path: "/v1/feeds",
        path_params: &[],
        query: &[],
    };

    pub const UPDATE: Operation = Operation {
        name: "update_feed",
        method: Method::Patch,
        path: "/v1/feeds/{feed_id}",
        path_params: &["feed_id"],
        query: &[],
    };

    pub const DELETE: Operation = Operation {
        name: "delete_feed",
        method: Method::Delete,
        path: "/v1/feeds/{feed_id}",
        path_params: &["feed_id"],
        query: &[],
    };

    pub const ENABLE: Operation = Operation {
        name: "enable_feed",
        method: Method::Post,
        path: "/v1/feeds/{feed_id}:enable",
        path_params: &["feed_id"],
        query: &[],
    };

    pub const DISABLE: Operation = Operation {
        name: "disable_feed",
        method: Method::Post,
        path: "/v1/feeds/{feed_id}:disable",
        path_params: &["feed_id"],
        query: &[],
    };
}

pub mod forwarders {
    use super::*;

    pub const LIST: Operation = Operation {
        name: "list_forwarders",
        method: Method::Get,
        path: "/v1/forwarders",
        path_params: &[],
        query: &[],
    };

    pub const GET: Operation = Operation {
        name: "get_forwarder",
        method: Method::Get,
        path: "/v1/forwarders/{forwarder_id}",
        path_params: &["forwarder_id"],
        query: &[],
    };

    pub const CREATE: Operation = Operation {
        name: "create_forwarder",
        method: Method::Post,
        path: "/v1/forwarders",
        path_params: &[],
        query: &[],
    };

    pub const UPDATE: Operation = Operation {
        name: "update_forwarder",
        method: Method::Patch,
        path: "/v1/forwarders/{forwarder_id}",
        path_params: &["forwarder_id"],
        query: &[],
    };

    pub const DELETE: Operation = Operation {
        name: "delete_forwarder",
        method: Method::Delete,
        path: "/v1/forwarders/{forwarder_id}",
        path_params: &["forwarder_id"],
        query: &[],
    };

    pub const GENERATE_FILES: Operation = Operation {
        name: "generate_forwarder_files",
        method: Method::Get,
        path: "/v1/forwarders/{forwarder_id}:generateForwarderFiles",
        path_params: &["forwarder_id"],
        query: &[],
    };
}

pub mod bigquery {
    use super::*;

    pub const PROVIDE_ACCESS: Operation = Operation {
        name: "provide_bq_access",
        method: Method::Patch,
        path: "/v1/tools/bigqueryAccess:update",
        path_params: &[],
        query: &[],
    };
}
