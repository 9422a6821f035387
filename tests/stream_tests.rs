use serde::{Deserialize, Serialize};
use serde_delimited::{BoundedString, Error, RecordReader, RecordWriter};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Sample {
    dato1: i32,
    dato2: f32,
    cadena: BoundedString<20>,
}

fn sample(dato1: i32, dato2: f32, cadena: &str) -> Sample {
    Sample {
        dato1,
        dato2,
        cadena: BoundedString::new(cadena),
    }
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fichero");

    {
        let file = File::create(&path).unwrap();
        let mut writer = RecordWriter::new(BufWriter::new(file));
        writer.write(&sample(23, 45.8, "prueba")).unwrap();
        writer.write(&sample(30, 70.965, "test con espacios")).unwrap();
        writer.flush().unwrap();
    }

    let mut contents = String::new();
    File::open(&path)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "23|45.8|prueba\n30|70.965|test con espacios\n");

    let reader = RecordReader::new(BufReader::new(File::open(&path).unwrap()));
    let records: Vec<Sample> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(
        records,
        vec![
            sample(23, 45.8, "prueba"),
            sample(30, 70.965, "test con espacios"),
        ]
    );
}

#[test]
fn test_append_keeps_earlier_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append");

    for (i, name) in ["uno", "dos", "tres"].iter().enumerate() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        let mut writer = RecordWriter::new(file);
        writer.write(&(i as u32, *name)).unwrap();
    }

    let mut reader: RecordReader<_, (u32, String)> =
        RecordReader::new(BufReader::new(File::open(&path).unwrap()));
    assert_eq!(reader.read().unwrap(), (0, "uno".to_string()));
    assert_eq!(reader.read().unwrap(), (1, "dos".to_string()));
    assert_eq!(reader.read().unwrap(), (2, "tres".to_string()));
    assert!(matches!(reader.read(), Err(Error::EndOfInput)));
}

#[test]
fn test_crashed_writer_leaves_truncated_tail() {
    let data = b"23|45.8|prueba\n30|70.9";
    let mut reader: RecordReader<_, Sample> = RecordReader::new(&data[..]);

    assert_eq!(reader.read().unwrap(), sample(23, 45.8, "prueba"));
    let err = reader.read().unwrap_err();
    assert!(matches!(err, Error::TruncatedRecord { .. }));
    assert_eq!(reader.line_number(), 2);
    assert!(reader.read().unwrap_err().is_eof());
}

#[test]
fn test_overflowing_line_in_file() {
    let data = "7|1.5|esta cadena supera los veinte caracteres\n";
    let mut reader: RecordReader<_, Sample> = RecordReader::new(data.as_bytes());
    let record = reader.read().unwrap();
    assert_eq!(record.cadena.as_str(), "esta cadena supera ");
    assert!(record.cadena.was_truncated());
}

#[test]
fn test_invalid_utf8_line() {
    let data: &[u8] = b"1|2.0|ok\n2|3.0|\xc3\x28\n";
    let results: Vec<_> = RecordReader::<_, Sample>::new(data).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::InvalidUtf8 { field: 2 })));
}
