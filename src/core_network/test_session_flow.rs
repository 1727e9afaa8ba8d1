// Full-stack exercises over real sockets: login, passive and active
// transfers, abort mid-flight, and the refusal paths.

use crate::core_network::network;
use crate::state::FtpState;
use crate::test_support::{make_state, make_state_with};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_server(state: Arc<FtpState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = network::serve(listener, state).await;
    });
    addr
}

struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (r, w) = stream.into_split();
        Client {
            reader: BufReader::new(r),
            writer: w,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "server closed the control connection unexpectedly");
        line.trim_end().to_string()
    }

    /// Reads one reply, multi-line blocks included, asserting its code.
    async fn expect(&mut self, code: u16) -> String {
        let first = self.read_line().await;
        let prefix = code.to_string();
        assert!(
            first.starts_with(&prefix),
            "expected {}, got: {}",
            code,
            first
        );
        let mut text = first.clone();
        if first.len() > 3 && first.as_bytes()[3] == b'-' {
            let closing = format!("{} ", code);
            loop {
                let line = self.read_line().await;
                text.push('\n');
                text.push_str(&line);
                if line.starts_with(&closing) {
                    break;
                }
            }
        }
        text
    }

    async fn expect_close(&mut self) {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert_eq!(n, 0, "expected close, got: {}", line.trim_end());
    }

    async fn login_guest(&mut self) {
        self.expect(220).await;
        self.send("USER anonymous").await;
        self.expect(331).await;
        self.send("PASS me@example.com").await;
        self.expect(230).await;
    }
}

fn pasv_port(reply: &str) -> u16 {
    let open = reply.find('(').unwrap();
    let close = reply.find(')').unwrap();
    let nums: Vec<u16> = reply[open + 1..close]
        .split(',')
        .map(|p| p.parse().unwrap())
        .collect();
    nums[4] * 256 + nums[5]
}

async fn write_fixture(state: &FtpState, path: &str, contents: &[u8]) {
    let mut w = state.fs.open_write(path, false).await.unwrap();
    w.write_all(contents).await.unwrap();
    w.shutdown().await.unwrap();
}

#[tokio::test]
async fn guest_login_and_pwd() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("PWD").await;
    let reply = client.expect(257).await;
    assert_eq!(reply, "257 \"/\" is current directory.");
}

#[tokio::test]
async fn anonymous_needs_a_mail_address() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.expect(220).await;
    client.send("USER anonymous").await;
    client.expect(331).await;
    client.send("PASS not a mail").await;
    client.expect(530).await;
}

#[tokio::test]
async fn commands_require_login() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.expect(220).await;
    client.send("PWD").await;
    let reply = client.expect(530).await;
    assert_eq!(reply, "530 Not logged in.");
    client.send("LIST").await;
    client.expect(530).await;
}

#[tokio::test]
async fn unknown_command_is_504() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("FOO bar").await;
    let reply = client.expect(504).await;
    assert_eq!(reply, "504 Not implemented.");
}

#[tokio::test]
async fn pasv_retr_round_trip() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/hello.txt", b"hello over the wire").await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE I").await;
    assert_eq!(client.expect(200).await, "200 Type set to I");

    client.send("PASV").await;
    let reply = client.expect(227).await;
    let port = pasv_port(&reply);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("RETR hello.txt").await;
    client.expect(150).await;

    let mut body = Vec::new();
    data.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"hello over the wire");

    let fin = client.expect(226).await;
    assert_eq!(fin, "226 Transfer completed for \"hello.txt\".");
    assert_eq!(
        state.registry.snapshot().downloaded_bytes,
        b"hello over the wire".len() as u64
    );
}

#[tokio::test]
async fn rest_skips_into_a_retrieve() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/digits.bin", b"0123456789").await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE I").await;
    client.expect(200).await;
    client.send("REST 4").await;
    client.expect(350).await;

    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("RETR digits.bin").await;
    client.expect(150).await;
    let mut body = Vec::new();
    data.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"456789");
    client.expect(226).await;
}

#[tokio::test]
async fn pasv_stor_round_trip() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE I").await;
    client.expect(200).await;
    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("STOR out.bin").await;
    client.expect(150).await;
    data.write_all(b"stored payload").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);

    let fin = client.expect(226).await;
    assert_eq!(fin, "226 Transfer completed for \"out.bin\".");

    let mut reader = state.fs.open_read("/out.bin", 0).await.unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"stored payload");
    assert_eq!(
        state.registry.snapshot().uploaded_bytes,
        b"stored payload".len() as u64
    );
}

#[tokio::test]
async fn port_stor_round_trip() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE I").await;
    client.expect(200).await;

    // The client listens; the server dials out after the 150.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = listener.local_addr().unwrap().port();
    client
        .send(&format!(
            "PORT 127,0,0,1,{},{}",
            data_port / 256,
            data_port % 256
        ))
        .await;
    assert_eq!(client.expect(200).await, "200 PORT command successful.");

    client.send("STOR active.bin").await;
    client.expect(150).await;

    let (mut data, _) = listener.accept().await.unwrap();
    data.write_all(b"dialed home").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);

    client.expect(226).await;
    let mut reader = state.fs.open_read("/active.bin", 0).await.unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"dialed home");
}

#[tokio::test]
async fn stor_then_retr_returns_identical_bytes() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    client.login_guest().await;
    client.send("TYPE I").await;
    client.expect(200).await;

    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("STOR blob.bin").await;
    client.expect(150).await;
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    client.expect(226).await;

    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("RETR blob.bin").await;
    client.expect(150).await;
    let mut body = Vec::new();
    data.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, payload);
    client.expect(226).await;
}

#[tokio::test]
async fn list_over_the_data_connection() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/visible.txt", b"abc").await;
    state.fs.mkdir("/docs").await.unwrap();
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("LIST").await;
    client.expect(150).await;
    let mut body = String::new();
    data.read_to_string(&mut body).await.unwrap();
    client.expect(226).await;

    assert!(body.contains(" visible.txt\r\n"));
    let dir_line = body
        .lines()
        .find(|l| l.ends_with(" docs"))
        .expect("docs line");
    assert!(dir_line.starts_with('d'));
}

#[tokio::test]
async fn mlsd_over_the_data_connection() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/fact.txt", b"xyz").await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("MLSD").await;
    client.expect(150).await;
    let mut body = String::new();
    data.read_to_string(&mut body).await.unwrap();
    client.expect(226).await;

    assert!(body.contains("type=cdir;"));
    assert!(body.contains("type=file;size=3;"));
    assert!(body.contains(" fact.txt\r\n"));
}

#[tokio::test]
async fn stou_picks_its_own_name() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("STOU").await;
    let opening = client.expect(150).await;
    let name = opening
        .split('"')
        .nth(1)
        .expect("150 carries the chosen name")
        .to_string();
    assert!(name.starts_with("stou-"));

    data.write_all(b"unique contents").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    let fin = client.expect(226).await;
    assert!(fin.contains(&name));

    let mut reader = state
        .fs
        .open_read(&format!("/{}", name), 0)
        .await
        .unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"unique contents");
}

#[tokio::test]
async fn abor_mid_transfer() {
    let (state, _guard) = make_state(true).await;
    // Large enough that the pump is guaranteed to still be pushing
    // against socket buffers when the ABOR lands.
    write_fixture(&state, "/big.bin", &vec![0u8; 8 * 1024 * 1024]).await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE I").await;
    client.expect(200).await;
    client.send("PASV").await;
    let port = pasv_port(&client.expect(227).await);
    let data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("RETR big.bin").await;
    client.expect(150).await;

    client.send("ABOR").await;
    let first = client.expect(426).await;
    assert_eq!(first, "426 Connection closed, transfer aborted.");
    let second = client.expect(226).await;
    assert_eq!(second, "226 Abort command successful.");
    drop(data);

    // Interrupt state is gone: ordinary commands flow again.
    client.send("NOOP").await;
    client.expect(200).await;
}

#[tokio::test]
async fn retr_without_opener_is_425() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/f.txt", b"x").await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("RETR f.txt").await;
    let reply = client.expect(425).await;
    assert_eq!(reply, "425 Use PORT or PASV first.");
}

#[tokio::test]
async fn rest_rejected_for_ascii_type() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("TYPE A").await;
    assert_eq!(client.expect(200).await, "200 Type set to A");
    client.send("REST 100").await;
    let reply = client.expect(550).await;
    assert_eq!(reply, "550 REST unavailable for TYPE A, MODE S, STRU F.");
}

#[tokio::test]
async fn suspended_server_turns_clients_away() {
    let (state, _guard) = make_state(true).await;
    state.set_suspended(true);
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    let reply = client.expect(421).await;
    assert_eq!(
        reply,
        "421 Service not available, closing control connection."
    );
    client.expect_close().await;
}

#[tokio::test]
async fn oversized_line_is_rejected() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.expect(220).await;
    let huge = vec![b'a'; 9 * 1024];
    client.writer.write_all(&huge).await.unwrap();
    client.writer.flush().await.unwrap();
    let reply = client.expect(500).await;
    assert_eq!(reply, "500 Line too long.");
    client.expect_close().await;
}

#[tokio::test]
async fn quit_closes_when_idle() {
    let (state, _guard) = make_state(true).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("QUIT").await;
    let reply = client.expect(221).await;
    assert_eq!(reply, "221 Service closing control connection.");
    client.expect_close().await;
}

#[tokio::test]
async fn idle_control_connection_times_out() {
    let (state, _guard) = make_state_with(true, 1, vec![0, 0, 0]).await;
    let addr = spawn_server(state).await;
    let mut client = Client::connect(addr).await;

    client.expect(220).await;
    let reply = client.expect(421).await;
    assert_eq!(reply, "421 Timeout.");
    client.expect_close().await;
}

#[tokio::test]
async fn exhausted_passive_pool_rejects_and_recovers() {
    let (state, _guard) = make_state_with(true, 5, vec![0]).await;
    let addr = spawn_server(state).await;

    let mut first = Client::connect(addr).await;
    first.login_guest().await;
    first.send("PASV").await;
    first.expect(227).await;

    let mut second = Client::connect(addr).await;
    second.login_guest().await;
    second.send("PASV").await;
    let reply = second.expect(425).await;
    assert_eq!(reply, "425 Can't open data connection.");

    // The first session walks away from its reservation; the slot is
    // free again for the second session.
    first.send("ABOR").await;
    first.expect(226).await;
    second.send("PASV").await;
    second.expect(227).await;
}

#[tokio::test]
async fn epsv_and_eprt_flows() {
    let (state, _guard) = make_state(true).await;
    write_fixture(&state, "/e.txt", b"extended").await;
    let addr = spawn_server(Arc::clone(&state)).await;
    let mut client = Client::connect(addr).await;

    client.login_guest().await;
    client.send("EPSV").await;
    let reply = client.expect(229).await;
    let open = reply.find("(|||").unwrap();
    let port: u16 = reply[open + 4..reply.len() - 2].parse().unwrap();
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.send("RETR e.txt").await;
    client.expect(150).await;
    let mut body = Vec::new();
    data.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"extended");
    client.expect(226).await;

    client.send("EPRT |3|1.2.3.4|21|").await;
    client.expect(501).await;
}
