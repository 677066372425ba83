// ABOUTME: Criterion benchmarks for the codec hot paths - encode and parse

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use smpp_sim::{Pdu, Tlv, encode_pdu, parse_pdu, tags};

fn sample_submit_sm() -> Pdu {
    Pdu::submit_sm()
        .with_source_addr("1234567890")
        .with_destination_addr("0987654321")
        .with_short_message("Hello World")
        .with_sequence_number(1)
}

fn sample_deliver_sm_with_receipt() -> Pdu {
    Pdu::deliver_sm()
        .with_source_addr("1234567890")
        .with_destination_addr("0987654321")
        .with_sequence_number(1)
        .with_tlv(Tlv::string(tags::RECEIPTED_MESSAGE_ID, "11107"))
        .with_tlv(Tlv::integer(tags::MESSAGE_STATE, 2))
        .with_tlv(Tlv::integer(tags::DELIVERY_FAILURE_REASON, 0))
}

fn encode_benchmarks(c: &mut Criterion) {
    let enquire_link = Pdu::enquire_link().with_sequence_number(1);
    let submit_sm = sample_submit_sm();
    let deliver_sm = sample_deliver_sm_with_receipt();

    c.bench_function("encode_enquire_link", |b| {
        b.iter(|| encode_pdu(black_box(&enquire_link)).unwrap())
    });
    c.bench_function("encode_submit_sm", |b| {
        b.iter(|| encode_pdu(black_box(&submit_sm)).unwrap())
    });
    c.bench_function("encode_deliver_sm_with_tlvs", |b| {
        b.iter(|| encode_pdu(black_box(&deliver_sm)).unwrap())
    });
}

fn parse_benchmarks(c: &mut Criterion) {
    let enquire_link = encode_pdu(&Pdu::enquire_link().with_sequence_number(1)).unwrap();
    let submit_sm = encode_pdu(&sample_submit_sm()).unwrap();
    let deliver_sm = encode_pdu(&sample_deliver_sm_with_receipt()).unwrap();

    c.bench_function("parse_enquire_link", |b| {
        b.iter(|| parse_pdu(black_box(&enquire_link)).unwrap())
    });
    c.bench_function("parse_submit_sm", |b| {
        b.iter(|| parse_pdu(black_box(&submit_sm)).unwrap())
    });
    c.bench_function("parse_deliver_sm_with_tlvs", |b| {
        b.iter(|| parse_pdu(black_box(&deliver_sm)).unwrap())
    });
}

criterion_group!(benches, encode_benchmarks, parse_benchmarks);
criterion_main!(benches);
