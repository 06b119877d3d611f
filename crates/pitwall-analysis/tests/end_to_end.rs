use pitwall_analysis::{
    cohort::front_back_division,
    config::AnalysisConfig,
    grouping::{pit_order_groups, stop_count_table},
    pipeline::FeaturePipeline,
    report::{ComparisonTest, Distribution, compare_front_back, pit_order_report},
    schema::{ABS_DEVIATION_MEAN, DRIVER_ID, LAP_PROP, RACE_ID, STATUS_ID, STOP_COUNT},
};
use pitwall_frame::{SuffixIdentifier, Table, Value, csv_io::read_csv, merge_tables};

const PIT_STOPS: &str = "\
raceId,driverId,stop,lap,time,duration,milliseconds
1,1,1,2,14:05:01,22.1,22100
1,1,2,5,14:10:01,22.3,22300
1,1,3,8,14:15:01,22.0,22000
1,2,1,10,14:20:01,23.4,23400
1,3,1,6,14:12:01,24.0,24000
1,3,2,14,14:30:01,21.9,21900
1,4,1,9,14:18:01,25.5,25500
2,1,1,30,15:01:00,21.0,21000
2,2,1,25,14:55:00,22.0,22000
";

const RESULTS: &str = "\
resultId,raceId,driverId,positionOrder,position,laps,time,statusId
10,1,1,1,1,20,1:30:00.000,1
11,1,2,2,2,20,+5.000,1
12,1,3,7,7,19,\\N,11
13,1,4,8,\\N,4,\\N,5
14,2,2,1,1,60,1:40:00.000,1
15,2,1,2,2,60,+1.000,1
";

const STATUS: &str = "\
statusId,status
1,Finished
5,Engine
11,+1 Lap
";

fn load(data: &str) -> Table {
    read_csv(data.as_bytes()).unwrap()
}

fn enriched() -> Table {
    let tables = [load(PIT_STOPS), load(RESULTS), load(STATUS)];
    let outcome = merge_tables(&tables, &SuffixIdentifier::default()).unwrap();
    assert!(outcome.is_connected());
    assert!(outcome.table.has_column("time_1"));
    assert!(outcome.table.has_column("time_2"));
    FeaturePipeline::default().run(&outcome.table).unwrap()
}

#[test]
fn status_filter_removes_retirements() {
    let table = enriched();
    assert!(
        table
            .column(STATUS_ID)
            .unwrap()
            .all(|v| matches!(v.as_i64(), Some(1 | 11)))
    );
    assert!(
        table
            .column(DRIVER_ID)
            .unwrap()
            .all(|v| v.as_i64() != Some(4))
    );
}

#[test]
fn races_keep_their_winner_first_stop() {
    let table = enriched();
    let races = table
        .column(RACE_ID)
        .unwrap()
        .filter_map(Value::as_i64)
        .collect::<std::collections::BTreeSet<_>>();
    assert_eq!(races.into_iter().collect::<Vec<_>>(), [1, 2]);
}

#[test]
fn winner_features_follow_even_spacing() {
    let table = enriched();
    let winner = table.filter(|row| row[0] == Value::Int(1) && row[1] == Value::Int(1));
    let props = winner.numeric_column(LAP_PROP).unwrap();
    let expected = [0.1, 0.25, 0.4];
    for (p, e) in props.iter().zip(expected) {
        assert!((p - e).abs() < 1e-12);
    }
    let mean = winner.numeric_column(ABS_DEVIATION_MEAN).unwrap()[0];
    assert!((mean - 0.25).abs() < 1e-12);
}

#[test]
fn groupings_cover_every_record() {
    let table = enriched();
    let groups = pit_order_groups(&table).unwrap();
    let grouped = groups.values().map(Table::len).sum::<usize>();
    assert_eq!(grouped, table.len());

    let counts = stop_count_table(&table).unwrap();
    let pairs = table
        .rows()
        .iter()
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect::<std::collections::BTreeSet<_>>();
    assert_eq!(counts.len(), pairs.len());
    assert!(counts.column(STOP_COUNT).unwrap().all(|v| v.as_i64() >= Some(1)));
}

#[test]
fn reports_run_on_enriched_table() {
    let table = enriched();
    let config = AnalysisConfig::default();

    let groups = pit_order_groups(&table).unwrap();
    let distributions = pit_order_report(&groups, &config).unwrap();
    assert_eq!(distributions.len(), 6);

    let splits = front_back_division(&table, LAP_PROP, config.max_pit, config.top_num).unwrap();
    let comparisons = compare_front_back(&splits, ComparisonTest::StudentT, &config);
    assert_eq!(comparisons.len(), splits.len());
    // the back cohort is resampled to the front size
    let count = |d: &Distribution| d.stats.as_ref().map_or(0, |s| s.count);
    for comparison in &comparisons {
        let expected = if comparison.back_population == 0 {
            0
        } else {
            count(&comparison.front)
        };
        assert_eq!(count(&comparison.back), expected);
    }
}
