use bytes::Bytes;
use cellbase::{
    Code, ColumnFamilyDescriptor, CompareOp, Comparator, Filter, FilterList, Get, Operator, Put,
    RowRange, Scan, SingleColumnValueFilter, Store, TableDescriptor,
};

/// `myTable` holds people with a name and a sex in `cf1` and a few parents
/// in `cf2`. `row10` sorts between `row1` and `row2`.
fn people() -> Store {
    let store = Store::new();
    store
        .create_table(
            TableDescriptor::new("myTable")
                .with_family(ColumnFamilyDescriptor::new("cf1"))
                .with_family(ColumnFamilyDescriptor::new("cf2")),
        )
        .unwrap();

    let puts = vec![
        Put::new("row1")
            .add_column("cf1", "name", "billyWangpaul")
            .add_column("cf1", "sex", "male")
            .add_column("cf2", "mam", "helen"),
        Put::new("row2")
            .add_column("cf1", "name", "sara")
            .add_column("cf1", "sex", "female"),
        Put::new("row3")
            .add_column("cf1", "name", "chris")
            .add_column("cf1", "sex", "male")
            .add_column("cf2", "dad", "tom"),
        Put::new("row4")
            .add_column("cf1", "name", "helen")
            .add_column("cf1", "sex", "female"),
        Put::new("row5")
            .add_column("cf1", "name", "andyWang")
            .add_column("cf1", "sex", "male"),
        Put::new("row6")
            .add_column("cf1", "name", "kateWang")
            .add_column("cf1", "sex", "female"),
        Put::new("row7").add_column("cf1", "name", "zed"),
        Put::new("row8").add_column("cf1", "name", "ann"),
        Put::new("row10").add_column("cf1", "name", "ten"),
    ];
    store.put_all("myTable", &puts).unwrap();
    store
}

/// `myage` holds an address, a name and a big-endian age per row.
fn ages() -> Store {
    let store = Store::new();
    store
        .create_table(TableDescriptor::new("myage").with_family(ColumnFamilyDescriptor::new("mycf")))
        .unwrap();

    let people = [
        ("row1", "beijing", "zhangsan", 25u32),
        ("row2", "beijing", "lisi", 8),
        ("row3", "hangzhou", "zhangsan", 10),
        ("row4", "hangzhou", "wangwu", 40),
        ("row5", "shanghai", "zhangsan", 11),
        ("row6", "shanghai", "zhaoliu", 3),
    ];
    for (row, address, name, age) in people {
        store
            .put(
                "myage",
                &Put::new(row)
                    .add_column("mycf", "address", address)
                    .add_column("mycf", "name", name)
                    .add_column("mycf", "age", age.to_be_bytes().to_vec()),
            )
            .unwrap();
    }
    store
}

fn scan_rows(store: &Store, table: &str, filter: Filter) -> Vec<String> {
    store
        .scan(table, Scan::new().with_filter(filter))
        .unwrap()
        .map(|r| String::from_utf8(r.unwrap().row().to_vec()).unwrap())
        .collect()
}

/// `row/family:qualifier` of every returned cell
fn scan_cells(store: &Store, table: &str, filter: Filter) -> Vec<String> {
    store
        .scan(table, Scan::new().with_filter(filter))
        .unwrap()
        .flat_map(|r| r.unwrap().into_cells())
        .map(|c| {
            format!(
                "{}/{}:{}",
                String::from_utf8_lossy(&c.row),
                String::from_utf8_lossy(&c.family),
                String::from_utf8_lossy(&c.qualifier)
            )
        })
        .collect()
}

#[test]
fn test_value_filter_substring() {
    let store = people();
    let filter = Filter::value(CompareOp::Equal, Comparator::substring("Wang")).unwrap();

    // Only the matching cells come back
    assert_eq!(
        scan_cells(&store, "myTable", filter),
        vec!["row1/cf1:name", "row5/cf1:name", "row6/cf1:name"]
    );
}

#[test]
fn test_value_filter_binary() {
    let store = people();

    let equal = Filter::value(CompareOp::Equal, Comparator::binary("sara")).unwrap();
    assert_eq!(scan_cells(&store, "myTable", equal), vec!["row2/cf1:name"]);

    let greater = Filter::value(CompareOp::Greater, Comparator::binary("male")).unwrap();
    assert_eq!(
        scan_cells(&store, "myTable", greater),
        vec!["row10/cf1:name", "row2/cf1:name", "row3/cf2:dad", "row7/cf1:name"]
    );
}

#[test]
fn test_single_column_value_filter() {
    let store = people();
    let sex_is_female = SingleColumnValueFilter::new(
        "cf1",
        "sex",
        CompareOp::Equal,
        Comparator::binary("female"),
    )
    .unwrap();

    // Rows without the column pass by default
    assert_eq!(
        scan_rows(&store, "myTable", sex_is_female.clone().into()),
        vec!["row10", "row2", "row4", "row6", "row7", "row8"]
    );

    let strict = sex_is_female.filter_if_missing(true);
    assert_eq!(
        scan_rows(&store, "myTable", strict.clone().into()),
        vec!["row2", "row4", "row6"]
    );

    // Every cell of a passing row is returned
    let result = store
        .get("myTable", &Get::new("row2").with_filter(strict))
        .unwrap();
    assert_eq!(result.len(), 2);
}

#[test]
fn test_single_column_value_filter_numeric() {
    let store = ages();
    let older_than_ten = Filter::single_column_value(
        "mycf",
        "age",
        CompareOp::Greater,
        Comparator::binary(10u32.to_be_bytes().to_vec()),
    )
    .unwrap();

    assert_eq!(
        scan_rows(&store, "myage", older_than_ten),
        vec!["row1", "row4", "row5"]
    );
}

#[test]
fn test_single_column_value_filter_latest_version() {
    let store = Store::new();
    store
        .create_table(
            TableDescriptor::new("t")
                .with_family(ColumnFamilyDescriptor::new("cf").with_max_versions(2)),
        )
        .unwrap();
    store.put_cell("t", "row1", "cf", "city", "beijing", Some(1)).unwrap();
    store.put_cell("t", "row1", "cf", "city", "shanghai", Some(2)).unwrap();

    let beijing = SingleColumnValueFilter::new(
        "cf",
        "city",
        CompareOp::Equal,
        Comparator::binary("beijing"),
    )
    .unwrap();

    let scan = Scan::new().with_max_versions(2);
    let latest: Vec<_> = store
        .scan("t", scan.clone().with_filter(beijing.clone()))
        .unwrap()
        .collect();
    assert!(latest.is_empty());

    let any_version: Vec<_> = store
        .scan("t", scan.with_filter(beijing.latest_version_only(false)))
        .unwrap()
        .collect();
    assert_eq!(any_version.len(), 1);
}

#[test]
fn test_family_filter() {
    let store = people();
    let filter = Filter::family(CompareOp::Equal, Comparator::binary("cf2")).unwrap();
    assert_eq!(
        scan_cells(&store, "myTable", filter),
        vec!["row1/cf2:mam", "row3/cf2:dad"]
    );
}

#[test]
fn test_qualifier_filter() {
    let store = people();
    let filter = Filter::qualifier(CompareOp::Equal, Comparator::binary("name")).unwrap();
    let cells = scan_cells(&store, "myTable", filter);
    assert_eq!(cells.len(), 9);
    assert!(cells.iter().all(|c| c.ends_with("cf1:name")));
}

#[test]
fn test_filter_list_must_pass_all() {
    let store = people();
    let mut list = FilterList::new(Operator::MustPassAll);
    list.add_filter(Filter::family(CompareOp::Equal, Comparator::binary("cf1")).unwrap())
        .add_filter(Filter::qualifier(CompareOp::Equal, Comparator::binary("name")).unwrap())
        .add_filter(Filter::value(CompareOp::Equal, Comparator::substring("Wang")).unwrap());

    assert_eq!(
        scan_cells(&store, "myTable", list.into()),
        vec!["row1/cf1:name", "row5/cf1:name", "row6/cf1:name"]
    );
}

#[test]
fn test_filter_list_must_pass_one() {
    let store = people();
    let filter = Filter::any(vec![
        Filter::prefix("row1"),
        Filter::value(CompareOp::Equal, Comparator::binary("helen")).unwrap(),
    ]);

    // row1 and row10 by key, plus the cell holding "helen" in row4
    assert_eq!(
        scan_cells(&store, "myTable", filter),
        vec![
            "row1/cf1:name",
            "row1/cf1:sex",
            "row1/cf2:mam",
            "row10/cf1:name",
            "row4/cf1:name"
        ]
    );
}

#[test]
fn test_nested_filter_lists() {
    // (address = 'beijing' OR address = 'shanghai') AND name = 'zhangsan'
    let store = ages();
    let city = |name: &str| {
        Filter::single_column_value(
            "mycf",
            "address",
            CompareOp::Equal,
            Comparator::binary(name.to_string()),
        )
        .unwrap()
    };
    let inner = FilterList::with_filters(Operator::MustPassOne, vec![city("beijing"), city("shanghai")]);
    let zhangsan = Filter::single_column_value(
        "mycf",
        "name",
        CompareOp::Equal,
        Comparator::binary("zhangsan"),
    )
    .unwrap();
    let outer = FilterList::with_filters(Operator::MustPassAll, vec![inner.into(), zhangsan]);

    let results: Vec<_> = store
        .scan("myage", Scan::new().with_filter(outer))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    let rows: Vec<_> = results.iter().map(|r| r.row().clone()).collect();
    assert_eq!(rows, vec![Bytes::from("row1"), Bytes::from("row5")]);
    assert!(results
        .iter()
        .all(|r| r.value(b"mycf", b"name") == Some(&Bytes::from("zhangsan"))));
}

#[test]
fn test_row_filter() {
    let store = people();
    let filter = Filter::row(CompareOp::LessOrEqual, Comparator::binary("row3")).unwrap();
    assert_eq!(
        scan_rows(&store, "myTable", filter),
        vec!["row1", "row10", "row2", "row3"]
    );
}

#[test]
fn test_row_range_filter() {
    let store = people();

    // Ranges given out of order are normalized
    let filter = Filter::row_ranges(vec![
        RowRange::new("row3", true, "row7", true).unwrap(),
        RowRange::new("row1", true, "row2", true).unwrap(),
    ])
    .unwrap();
    assert_eq!(
        scan_rows(&store, "myTable", filter),
        vec!["row1", "row10", "row2", "row3", "row4", "row5", "row6", "row7"]
    );

    let exclusive = Filter::row_ranges(vec![RowRange::new("row1", false, "row8", false).unwrap()])
        .unwrap();
    assert_eq!(
        scan_rows(&store, "myTable", exclusive),
        vec!["row10", "row2", "row3", "row4", "row5", "row6", "row7"]
    );

    let err = RowRange::new("row8", true, "row1", true).unwrap_err();
    assert_eq!(err.code(), &Code::MalformedKeyRange);
    let err = Filter::row_ranges(Vec::new()).unwrap_err();
    assert_eq!(err.code(), &Code::EmptyFilterConfig);
}

#[test]
fn test_prefix_filter() {
    let store = people();
    assert_eq!(
        scan_rows(&store, "myTable", Filter::prefix("row1")),
        vec!["row1", "row10"]
    );
    assert!(scan_rows(&store, "myTable", Filter::prefix("zzz")).is_empty());
}

#[test]
fn test_fuzzy_row_filter() {
    let store = people();

    // '?' positions are wildcards: any row whose 2nd byte is 'o' and 4th is '2'
    let filter = Filter::fuzzy([("?o?2", vec![1u8, 0, 1, 0])]).unwrap();
    assert_eq!(scan_rows(&store, "myTable", filter), vec!["row2"]);

    let filter = Filter::fuzzy([("row?", vec![0u8, 0, 0, 1]), ("???1", vec![1u8, 1, 1, 0])]).unwrap();
    assert_eq!(
        scan_rows(&store, "myTable", filter),
        vec!["row1", "row10", "row2", "row3", "row4", "row5", "row6", "row7", "row8"]
    );

    let err = Filter::fuzzy([("row", vec![0u8, 0])]).unwrap_err();
    assert_eq!(err.code(), &Code::InvalidFilterConfig);
}

#[test]
fn test_column_prefix_filters() {
    let store = people();

    let cells = scan_cells(&store, "myTable", Filter::column_prefix("na"));
    assert_eq!(cells.len(), 9);

    let filter = Filter::multi_column_prefix(["na", "se", "da"]).unwrap();
    let cells = scan_cells(&store, "myTable", filter);
    assert!(cells.contains(&"row3/cf2:dad".to_string()));
    assert!(!cells.contains(&"row1/cf2:mam".to_string()));
    // 9 names, 6 sexes, 1 dad
    assert_eq!(cells.len(), 16);

    let err = Filter::multi_column_prefix(Vec::<Bytes>::new()).unwrap_err();
    assert_eq!(err.code(), &Code::EmptyFilterConfig);
}

#[test]
fn test_key_only_and_first_key_only() {
    let store = people();

    let results: Vec<_> = store
        .scan("myTable", Scan::new().with_filter(Filter::key_only()))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(results.len(), 9);
    assert!(results
        .iter()
        .flat_map(|r| r.cells())
        .all(|c| c.value.is_empty()));

    let combined = Filter::all(vec![Filter::first_key_only(), Filter::key_only()]);
    let cells = scan_cells(&store, "myTable", combined);
    assert_eq!(cells.len(), 9);
    assert_eq!(cells[0], "row1/cf1:name");
}

#[test]
fn test_column_count_filter() {
    let store = people();
    let cells = scan_cells(&store, "myTable", Filter::column_count(2));
    assert_eq!(
        cells.iter().filter(|c| c.starts_with("row1/")).count(),
        2
    );
    assert_eq!(
        cells.iter().filter(|c| c.starts_with("row3/")).count(),
        2
    );
}

#[test]
fn test_substring_requires_equality() {
    let err = Filter::value(CompareOp::Greater, Comparator::substring("Wang")).unwrap_err();
    assert_eq!(err.code(), &Code::InvalidFilterConfig);
    assert!(Filter::value(CompareOp::NotEqual, Comparator::substring("Wang")).is_ok());
}

#[test]
fn test_get_with_filter() {
    let store = people();
    let filter = Filter::value(CompareOp::Equal, Comparator::substring("Wang")).unwrap();

    let result = store
        .get("myTable", &Get::new("row5").with_filter(filter.clone()))
        .unwrap();
    assert_eq!(result.len(), 1);

    // A rejected row reads like a missing one
    let result = store
        .get("myTable", &Get::new("row2").with_filter(filter))
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_empty_filter_list_passes_everything() {
    let store = people();
    let all = Filter::all(Vec::new());
    let any = Filter::any(Vec::new());
    assert_eq!(scan_rows(&store, "myTable", all).len(), 9);
    assert_eq!(scan_rows(&store, "myTable", any).len(), 9);
}
