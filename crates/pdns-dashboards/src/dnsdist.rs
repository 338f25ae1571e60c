// Numan Thabit 2025
//! The default dashboard for dnsdist, fed by the carbon metrics dnsdist
//! pushes under `dnsdist.<server>.main.*`.

use crate::{
    compact, ChoiceVar, Dashboard, DashboardError, Graph, QueryVar, RowOptions,
};

pub const TITLE: &str = "PowerDNS dnsdist [default]";
pub const FILE_NAME: &str = "dnsdist.json";

const SMOOTHING_OPTIONS: [&str; 13] = [
    "1", "3", "5", "7", "10", "15", "20", "30", "50", "'5min'", "'10min'", "'30min'", "'1hour'",
];

pub fn build(datasource: &str) -> Result<Dashboard, DashboardError> {
    let mut dash = Dashboard::new(TITLE).with_datasource(datasource);

    dash.add_template_var(QueryVar::new("dnsdist", "dnsdist server", "dnsdist.*"));
    dash.add_template_var_choice(
        ChoiceVar::new("smoothing", "smoothing (moving average)", SMOOTHING_OPTIONS)
            .default_value(5),
    )?;

    dash.add_graph_row(
        Graph::new(
            "Number of queries",
            [
                "alias(movingAverage(dnsdist.$dnsdist.main.servfail-responses_dt, $smoothing), 'Servfail/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.queries_dt, $smoothing), 'Queries/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.responses_dt, $smoothing), 'Responses/s')",
            ],
        ),
        false,
    )?;

    let row = dash.add_row("Latency");
    dash.add_graph(
        row,
        Graph::new(
            "Latency (answers/s in a latency band)",
            [
                "alias(movingAverage(dnsdist.$dnsdist.main.latency0-1_dt, $smoothing), '<1 ms')",
                "alias(movingAverage(dnsdist.$dnsdist.main.latency1-10_dt, $smoothing), '<10 ms')",
                "alias(movingAverage(dnsdist.$dnsdist.main.latency10-50_dt, $smoothing), '<50 ms')",
                "alias(movingAverage(dnsdist.$dnsdist.main.latency50-100_dt, $smoothing), '<100 ms')",
                "alias(movingAverage(dnsdist.$dnsdist.main.latency100-1000_dt, $smoothing), '<1000 ms')",
                "alias(movingAverage(dnsdist.$dnsdist.main.latency-slow_dt, $smoothing), 'With slow answers')",
            ],
        )
        .span(6)
        .stack(true),
    )?;
    dash.add_graph(
        row,
        Graph::new(
            "Average latency",
            [
                "alias(dnsdist.$dnsdist.main.latency-avg100, '100 packet average')",
                "alias(dnsdist.$dnsdist.main.latency-avg10000, '10,000 packet average')",
                "alias(dnsdist.$dnsdist.main.latency-avg1000000, '1,000,000 packet average')",
            ],
        )
        .span(6)
        .y_format("µs"),
    )?;

    let row = dash.add_row("Queries drops and policy");
    dash.add_graph(
        row,
        Graph::new(
            "Query drops",
            [
                "alias(movingAverage(dnsdist.$dnsdist.main.rule-drop_dt, $smoothing), 'Rule drops/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.acl-drops_dt, $smoothing), 'ACL drops/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.dyn-blocked_dt, $smoothing), 'Dynamic drops/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.block-filter_dt, $smoothing), 'Blockfilter drops/s')",
            ],
        )
        .span(6),
    )?;
    dash.add_graph(
        row,
        Graph::new(
            "Query policy",
            [
                "alias(movingAverage(dnsdist.$dnsdist.main.rdqueries_dt, $smoothing), 'RD Queries/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.rule-nxdomain_dt, $smoothing), 'Rule NXDomain/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.self-answered_dt, $smoothing), 'Rule self-answered/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.no-policy_dt, $smoothing), 'No policy/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.noncompliant-queries_dt, $smoothing), 'Non-compliant queries/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.noncompliant-responses_dt, $smoothing), 'Non-compliant responses/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.empty-queries_dt, $smoothing), 'Empty queries/s')",
            ],
        )
        .span(6),
    )?;

    let row = dash.add_row("Timeouts, errors and cache miss rate");
    dash.add_graph(
        row,
        Graph::new(
            "Timeouts and errors",
            [
                "alias(movingAverage(dnsdist.$dnsdist.main.downstream-timeouts_dt, $smoothing), 'Timeouts/s')",
                "alias(movingAverage(dnsdist.$dnsdist.main.downstream-send-errors_dt, $smoothing), 'Errors/s')",
            ],
        )
        .span(6),
    )?;
    // A single miss on an idle server reads as 100%.
    dash.add_graph(
        row,
        Graph::new(
            "Cache miss rate",
            [compact(
                "
                alias(movingAverage(
                    divideSeries(
                        dnsdist.$dnsdist.main.cache-misses_dt,
                        sumSeries(
                            dnsdist.$dnsdist.main.cache-misses_dt,
                            dnsdist.$dnsdist.main.cache-hits_dt
                        )
                    )
                , $smoothing), 'cache miss rate (%)')
                ",
            )],
        )
        .span(6)
        .y_format("percentunit"),
    )?;

    let row = dash.add_row("CPU and memory usage");
    dash.add_graph(
        row,
        Graph::new(
            "CPU usage",
            [
                "alias(scale(movingAverage(dnsdist.$dnsdist.main.cpu-sys-msec_dt, $smoothing), 0.1), 'System CPU')",
                "alias(scale(movingAverage(dnsdist.$dnsdist.main.cpu-user-msec_dt, $smoothing), 0.1), 'Total (system+user) CPU')",
            ],
        )
        .span(6)
        .y_format("percent")
        .stack(true),
    )?;
    dash.add_graph(
        row,
        Graph::new(
            "Memory usage",
            ["alias(dnsdist.$dnsdist.main.real-memory-usage, 'Memory usage')"],
        )
        .span(6)
        .y_format("bytes"),
    )?;

    let row = dash.add_row("File descriptors, uptime and dynamic block size");
    dash.add_graph(
        row,
        Graph::new(
            "File descriptor usage",
            ["alias(dnsdist.$dnsdist.main.fd-usage, 'Number of file descriptors')"],
        )
        .span(4),
    )?;
    dash.add_graph(
        row,
        Graph::new("Uptime", ["alias(dnsdist.$dnsdist.main.uptime, 'Uptime')"])
            .span(4)
            .y_format("s"),
    )?;
    dash.add_graph(
        row,
        Graph::new(
            "Dynamic block size",
            ["alias(dnsdist.$dnsdist.main.dyn-block-nmg-size, 'Number of entries')"],
        )
        .span(4),
    )?;

    let row = dash.add_row_with(breakdown_row("Per server statistics"));
    for (title, target, span, y_format) in [
        (
            "Queries/s per server",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.servers.*.queries_dt, $smoothing), 4)",
            6,
            "short",
        ),
        (
            "Latency per server",
            "aliasByNode(dnsdist.$dnsdist.main.servers.*.latency, 4)",
            6,
            "µs",
        ),
        (
            "Drops/s per server",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.servers.*.drops_dt, $smoothing), 4)",
            4,
            "short",
        ),
        (
            "Send errors/s per server",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.servers.*.senderrors_dt, $smoothing), 4)",
            4,
            "short",
        ),
        (
            "Outstanding per server",
            "aliasByNode(dnsdist.$dnsdist.main.servers.*.outstanding, 4)",
            4,
            "short",
        ),
    ] {
        dash.add_graph(row, Graph::new(title, [target]).span(span).y_format(y_format))?;
    }

    let row = dash.add_row_with(breakdown_row("Per pool statistics"));
    for (title, target, span) in [
        (
            "Servers per pool",
            "aliasByNode(dnsdist.$dnsdist.main.pools.*.servers, 4)",
            4,
        ),
        (
            "Cache size per pool (max number of entries)",
            "aliasByNode(dnsdist.$dnsdist.main.pools.*.cache-size, 4)",
            4,
        ),
        (
            "Cache size per pool (current number of entries)",
            "aliasByNode(dnsdist.$dnsdist.main.pools.*.cache-entries, 4)",
            4,
        ),
        (
            "Cache hits per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-hits_dt, $smoothing), 4)",
            6,
        ),
        (
            "Cache misses per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-misses_dt, $smoothing), 4)",
            6,
        ),
        (
            "Cache deferred inserts per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-deferred-inserts_dt, $smoothing), 4)",
            3,
        ),
        (
            "Cache deferred lookups per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-deferred-lookups_dt, $smoothing), 4)",
            3,
        ),
        (
            "Cache insert collisions per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-insert-collisions_dt, $smoothing), 4)",
            3,
        ),
        (
            "Cache lookup collisions per pool",
            "aliasByNode(movingAverage(dnsdist.$dnsdist.main.pools.*.cache-lookup-collisions_dt, $smoothing), 4)",
            3,
        ),
    ] {
        dash.add_graph(row, Graph::new(title, [target]).span(span))?;
    }

    let row = dash.add_row_with(breakdown_row("Per frontend statistics"));
    dash.add_graph(
        row,
        Graph::new(
            "Queries/s per frontend",
            ["aliasByNode(movingAverage(dnsdist.$dnsdist.main.frontends.*.queries_dt, $smoothing), 4)"],
        ),
    )?;

    dash.add_annotation(
        "dnsdist restart",
        "alias(removeAboveValue(derivative(dnsdist.$dnsdist.main.uptime), -10), 'dnsdist restart')",
    );

    Ok(dash)
}

/// Titled row that starts folded.
fn breakdown_row(title: &str) -> RowOptions {
    RowOptions::new(title).collapse(true).show_title(true)
}
