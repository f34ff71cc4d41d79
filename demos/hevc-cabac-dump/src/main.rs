//! Walks a raw CABAC-coded slice-segment payload (NAL unit body, RBSP
//! trailing bits already stripped by the caller) and prints how many
//! `end_of_slice_segment_flag` terminations it finds before the
//! engine's input is exhausted. This is a smoke-test harness, not a
//! full HEVC decoder: it stops at the CABAC-termination bin and never
//! walks into the CU tree, since the CU tree's syntax also needs the
//! CTB geometry, SPS/PPS, and reference-picture state this crate
//! deliberately leaves to the caller.

extern crate clap;

use std::fs;
use std::path::Path;
use std::process;

use clap::{App, Arg};
use log::info;

use hevc_cabac::context::InitType;
use hevc_cabac::params::SliceType;
use hevc_cabac::slice::SliceDecoder;

fn parse_slice_type(s: &str) -> SliceType {
    match s.to_ascii_uppercase().as_str() {
        "I" => SliceType::I,
        "P" => SliceType::P,
        "B" => SliceType::B,
        other => {
            eprintln!("unrecognized slice type '{other}', expected I, P, or B");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let matches = App::new("hevc-cabac-dump")
        .about("Walks a CABAC-coded HEVC slice segment and reports termination points")
        .arg(
            Arg::new("input-path")
                .help("raw slice-segment payload to read")
                .short('i')
                .long("input")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("slice-type")
                .help("slice_type (I, P, or B)")
                .short('t')
                .long("slice-type")
                .takes_value(true)
                .default_value("I"),
        )
        .arg(
            Arg::new("qp")
                .help("SliceQpY")
                .short('q')
                .long("qp")
                .takes_value(true)
                .default_value("26"),
        )
        .arg(
            Arg::new("cabac-init")
                .help("cabac_init_flag")
                .long("cabac-init"),
        )
        .get_matches();

    let input_path = matches.value_of("input-path").map(Path::new).unwrap();
    let slice_type = parse_slice_type(matches.value_of("slice-type").unwrap());
    let cabac_init_flag = matches.is_present("cabac-init");
    let slice_qp_y: i32 = matches
        .value_of("qp")
        .unwrap()
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("qp must be an integer");
            process::exit(1);
        });

    let buf = fs::read(input_path).unwrap_or_else(|e| {
        eprintln!("failed to read {}: {e}", input_path.display());
        process::exit(1);
    });

    let init_type: InitType = slice_type.init_type(cabac_init_flag);
    let mut sd = SliceDecoder::new(&buf, init_type, slice_qp_y).unwrap_or_else(|e| {
        eprintln!("failed to initialize CABAC engine: {e}");
        process::exit(1);
    });

    info!("decoding {} bytes at slice_qp_y={slice_qp_y}", buf.len());

    let mut terminations = 0u32;
    loop {
        match sd.end_of_slice_segment_flag() {
            Ok(true) => {
                terminations += 1;
                println!("end_of_slice_segment_flag = 1 after {} bytes", sd.bytes_consumed());
                break;
            }
            Ok(false) => {
                terminations += 1;
                if sd.bytes_consumed() >= buf.len() {
                    println!("input exhausted after {terminations} reads without a terminating bin");
                    break;
                }
            }
            Err(e) => {
                eprintln!("decode error after {} bytes: {e}", sd.bytes_consumed());
                process::exit(1);
            }
        }
    }
}
