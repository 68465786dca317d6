use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use eventsearch::config::Config;
use eventsearch::database;
use eventsearch::filter::{
    CommonSearchParams, FsEventSearch, LogEventSearch, Order, ProviderEventSearch,
};
use eventsearch::search::{SearchPage, Searcher};
use serde::Serialize;

#[derive(Subcommand)]
pub enum SearchCommands {
    /// Search filesystem events
    Fs {
        #[command(flatten)]
        common: CommonArgs,

        /// SSH command
        #[arg(long, value_name = "CMD")]
        ssh_cmd: Option<String>,

        /// Protocols (repeatable)
        #[arg(long = "protocol", value_name = "PROTOCOL")]
        protocols: Vec<String>,

        /// Statuses (repeatable)
        #[arg(long = "status", value_name = "STATUS")]
        statuses: Vec<i32>,

        /// Filesystem provider; negative values match every provider
        #[arg(long, value_name = "PROVIDER", allow_negative_numbers = true)]
        fs_provider: Option<i32>,

        /// Bucket name
        #[arg(long)]
        bucket: Option<String>,

        /// Endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Search provider events
    Provider {
        #[command(flatten)]
        common: CommonArgs,

        /// Object types (repeatable)
        #[arg(long = "object-type", value_name = "TYPE")]
        object_types: Vec<String>,

        /// Object name
        #[arg(long, value_name = "NAME")]
        object_name: Option<String>,

        /// Leave the serialized object out of the results
        #[arg(long)]
        omit_object_data: bool,
    },
    /// Search log events
    Log {
        #[command(flatten)]
        common: CommonArgs,

        /// Log event types (repeatable)
        #[arg(long = "event", value_name = "EVENT")]
        events: Vec<i32>,

        /// Protocols (repeatable)
        #[arg(long = "protocol", value_name = "PROTOCOL")]
        protocols: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OrderArg {
    Asc,
    #[default]
    Desc,
}

/// Parameters shared by every event kind
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Inclusive lower timestamp bound
    #[arg(long, value_name = "TS")]
    start: Option<i64>,

    /// Inclusive upper timestamp bound
    #[arg(long, value_name = "TS")]
    end: Option<i64>,

    /// Actions (repeatable, ignored for log events)
    #[arg(long = "action", value_name = "ACTION")]
    actions: Vec<String>,

    /// Username
    #[arg(long)]
    username: Option<String>,

    /// Client IP address
    #[arg(long)]
    ip: Option<String>,

    /// Instance ids (repeatable)
    #[arg(long = "instance-id", value_name = "ID")]
    instance_ids: Vec<String>,

    /// Ids to skip, from the previous page's tie set (deprecated, prefer --from-id)
    #[arg(long = "exclude-id", value_name = "ID", conflicts_with = "from_id")]
    exclude_ids: Vec<String>,

    /// Continue after this id; needs --start (asc) or --end (desc)
    #[arg(long, value_name = "ID")]
    from_id: Option<String>,

    /// Role
    #[arg(long)]
    role: Option<String>,

    /// Maximum number of events
    #[arg(short, long, default_value = "100")]
    limit: i32,

    /// Sort order
    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    order: OrderArg,
}

impl From<OrderArg> for Order {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => Order::Ascending,
            OrderArg::Desc => Order::Descending,
        }
    }
}

impl From<CommonArgs> for CommonSearchParams {
    fn from(args: CommonArgs) -> Self {
        Self {
            start_timestamp: args.start.unwrap_or_default(),
            end_timestamp: args.end.unwrap_or_default(),
            actions: args.actions,
            username: args.username.unwrap_or_default(),
            ip: args.ip.unwrap_or_default(),
            instance_ids: args.instance_ids,
            exclude_ids: args.exclude_ids,
            from_id: args.from_id.unwrap_or_default(),
            role: args.role.unwrap_or_default(),
            limit: args.limit,
            order: Order::from(args.order).as_flag(),
        }
    }
}

/// Printed form of a page
#[derive(Serialize)]
struct PageOutput {
    events: serde_json::Value,
    same_ts_at_start: Vec<String>,
    same_ts_at_end: Vec<String>,
}

impl TryFrom<SearchPage> for PageOutput {
    type Error = serde_json::Error;

    fn try_from(page: SearchPage) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            events: serde_json::from_slice(&page.data)?,
            same_ts_at_start: page.same_ts_at_start,
            same_ts_at_end: page.same_ts_at_end,
        })
    }
}

pub async fn execute(config: Config, command: SearchCommands) -> Result<()> {
    let store = database::initialize(&config.store)
        .await
        .with_context(|| format!("Failed to initialize {} event store", config.store.driver))?;
    let searcher = Searcher::new(store);

    let page = match command {
        SearchCommands::Fs {
            common,
            ssh_cmd,
            protocols,
            statuses,
            fs_provider,
            bucket,
            endpoint,
        } => {
            let filters = FsEventSearch {
                common: common.into(),
                ssh_cmd: ssh_cmd.unwrap_or_default(),
                protocols,
                statuses,
                fs_provider,
                bucket: bucket.unwrap_or_default(),
                endpoint: endpoint.unwrap_or_default(),
            };
            searcher.search_fs_events(&filters).await
        }
        SearchCommands::Provider {
            common,
            object_types,
            object_name,
            omit_object_data,
        } => {
            let filters = ProviderEventSearch {
                common: common.into(),
                object_types,
                object_name: object_name.unwrap_or_default(),
                omit_object_data,
            };
            searcher.search_provider_events(&filters).await
        }
        SearchCommands::Log {
            common,
            events,
            protocols,
        } => {
            let filters = LogEventSearch {
                common: common.into(),
                events,
                protocols,
            };
            searcher.search_log_events(&filters).await
        }
    }
    .context("Search failed")?;

    let output = PageOutput::try_from(page).context("Invalid search payload")?;
    tracing::info!(
        events = output.events.as_array().map_or(0, Vec::len),
        same_ts_at_end = output.same_ts_at_end.len(),
        "Search completed"
    );
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
