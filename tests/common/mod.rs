#![allow(dead_code)]

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tsfeat::config::Config;

pub fn tmp_dir(name: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "tsfeat_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).expect("create tmp dir");
    p
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create partition dir");
    }
    fs::write(path, contents).expect("write csv");
}

pub fn flag_of(i: usize) -> f64 {
    (i % 4) as f64
}

pub fn write_non_ts(dir: &Path, date: &str, ids: Range<usize>) {
    let mut s = String::from("id,date,f0,f1,flag\n");
    for i in ids {
        let f0 = ((i * 7) % 11) as f64;
        let f1 = i as f64 * 0.5 + (i % 3) as f64;
        s.push_str(&format!("{i},{date},{f0},{f1},{}\n", flag_of(i)));
    }
    write(&dir.join("non_ts.csv"), &s);
}

pub fn write_target(dir: &Path, date: &str, ids: Range<usize>) {
    let mut s = String::from("id,date,y\n");
    for i in ids {
        s.push_str(&format!("{i},{date},{}\n", i as f64 * 0.1));
    }
    write(&dir.join("y.csv"), &s);
}

/// `offsets` observation columns named 0..offsets.
pub fn write_ts(dir: &Path, name: &str, date: &str, ids: Range<usize>, offsets: usize) {
    let mut s = String::from("id,date");
    for k in 0..offsets {
        s.push_str(&format!(",{k}"));
    }
    s.push('\n');
    for i in ids {
        s.push_str(&format!("{i},{date}"));
        for k in 0..offsets {
            s.push_str(&format!(",{}", ((i + k) * 13) % 17));
        }
        s.push('\n');
    }
    write(&dir.join(format!("{name}.csv")), &s);
}

/// A train partition with full coverage: `ids` in every table and one
/// 25-offset series `ts_price`.
pub fn write_train_partition(root: &Path, date: &str, ids: Range<usize>) -> PathBuf {
    let dir = root.join(date);
    write_non_ts(&dir, date, ids.clone());
    write_target(&dir, date, ids.clone());
    write_ts(&dir, "ts_price", date, ids, 25);
    dir
}

pub fn write_test_partition(root: &Path, date: &str, ids: Range<usize>) -> PathBuf {
    let dir = root.join(date);
    write_non_ts(&dir, date, ids.clone());
    write_ts(&dir, "ts_price", date, ids, 25);
    dir
}

pub fn dates(n: usize) -> Vec<String> {
    (0..n).map(|d| format!("201302{:02}", d + 1)).collect()
}

pub fn config_for(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.datas.origin_train_path = root.join("origin/train");
    cfg.datas.origin_test_path = root.join("origin/test");
    cfg.datas.generate_train_path = root.join("out/train.csv");
    cfg.datas.generate_validate_path = root.join("out/validate.csv");
    cfg.datas.generate_test_path = root.join("out/test.csv");
    cfg
}
