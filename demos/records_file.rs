//! Writing records to a file and reading them back.
//!
//! Run with: cargo run --example records_file

use serde::{Deserialize, Serialize};
use serde_delimited::{BoundedString, RecordReader, RecordWriter};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};

#[derive(Debug, Serialize, Deserialize)]
struct Datos {
    dato1: i32,
    dato2: f32,
    cadena: BoundedString<20>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fichero");

    {
        let mut writer = RecordWriter::new(BufWriter::new(File::create(&path)?));
        writer.write(&Datos {
            dato1: 23,
            dato2: 45.8,
            cadena: BoundedString::new("prueba"),
        })?;
        writer.write(&Datos {
            dato1: 30,
            dato2: 70.965,
            cadena: BoundedString::new("test con espacios"),
        })?;
        writer.flush()?;
    }

    println!("File contents:");
    print!("{}", std::fs::read_to_string(&path)?);

    println!("\nRecords read back:");
    let reader: RecordReader<_, Datos> = RecordReader::new(BufReader::new(File::open(&path)?));
    for record in reader {
        let datos = record?;
        println!("{} {} {}", datos.dato1, datos.dato2, datos.cadena);
    }

    Ok(())
}
