use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::Duration;

use fblink_session::{ConnectionParams, FbSocket, ServiceType};
use fblink_types::{DateAndTime, WireType};

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind should work");
    listener
        .local_addr()
        .expect("bound listener should have an address")
}

fn connect_with_retry(params: &ConnectionParams) -> FbSocket {
    for _ in 0..100 {
        if let Ok(socket) = params.make_socket() {
            return socket;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("peer never became reachable");
}

#[test]
fn multi_slot_frame_round_trips_through_an_echo_server() {
    let addr = free_addr();
    let reference = DateAndTime::from_year(2017);

    let add_slots = |params: &mut ConnectionParams| {
        params.add_input_output(WireType::Real);
        params.add_input_output_array(WireType::Int, 4);
        params.add_input_output(WireType::String);
        params.add_input_output(WireType::DateAndTime);
    };

    let server = thread::spawn(move || {
        let mut params = ConnectionParams::new(addr, ServiceType::Server);
        add_slots(&mut params);
        let mut socket = params.make_socket().expect("server should accept");
        assert!(!socket.is_split());
        socket.set_time_reference(&DateAndTime::from_year(2017));

        socket.recv_data().expect("server should receive");
        let real = socket.get_float().expect("float slot");
        let ints = socket.get_int_array().expect("int array slot");
        let text = socket.get_str().expect("string slot");
        let stamp = socket.get_date_and_time().expect("timestamp slot");

        socket.rewind();
        socket.put_float(real);
        socket.put_int_array(&ints);
        socket.put_str(&text);
        socket.put_date_and_time(&stamp);
        socket.send_data().expect("server should echo");
    });

    let mut params = ConnectionParams::new(addr, ServiceType::Client);
    add_slots(&mut params);
    let mut client = connect_with_retry(&params);
    client.set_time_reference(&reference);

    let mut stamp = reference;
    stamp.set_simulation_secs(90);

    client.put_float(5.5);
    client.put_int_array(&[1, -2, 3, -4]);
    client.put_str("five");
    client.put_date_and_time(&stamp);
    client.send_data().expect("client should send");

    client.recv_data().expect("client should receive the echo");
    assert!(client.is_float());
    assert_eq!(client.get_float().expect("float slot"), 5.5);
    assert!(client.is_int_array());
    assert_eq!(
        client.get_int_array().expect("int array slot"),
        vec![1, -2, 3, -4]
    );
    assert!(client.is_str());
    assert_eq!(client.get_str().expect("string slot"), "five");
    assert!(client.is_date_and_time());
    let echoed = client.get_date_and_time().expect("timestamp slot");
    assert_eq!(echoed.simulation_secs(), 90);
    assert_eq!(echoed.to_string(), "01.01.2017 00:01:30");

    server.join().expect("server thread should complete");
}

#[test]
fn explicit_ack_answers_a_one_way_request() {
    let addr = free_addr();

    let server = thread::spawn(move || {
        let mut params = ConnectionParams::new(addr, ServiceType::Server);
        params.add_output(WireType::Lreal);
        let mut socket = params.make_socket().expect("server should accept");
        assert!(socket.is_split());

        socket.recv_data().expect("server should receive");
        assert_eq!(socket.get_double().expect("payload slot"), 5.0);
        socket.send_ack().expect("server should acknowledge");
    });

    let mut params = ConnectionParams::new(addr, ServiceType::Client);
    params.add_input(WireType::Lreal);
    let mut client = connect_with_retry(&params);

    client.put_double(5.0);
    client.send_data().expect("client should send");
    // The ack comes back as an empty frame; receiving it must not error.
    client.recv_data().expect("client should see the ack");

    client.disconnect().expect("disconnect should succeed");
    assert!(!client.is_connected());
    server.join().expect("server thread should complete");
}
