use super::*;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};
use tempfile::TempDir;

use uploads::image_store::DiskImageStore;
use ODM::memory::MemoryStore;
use ODM::models::WebsiteSettings;
use ODM::testutils::{sample_car_json, UnreadableSettings};

const MB: usize = 1024 * 1024;
const BOUNDARY: &str = "X-CARRENTAL-BOUNDARY";

/// The client, and the upload directory that lives as long as it is held
async fn launch(store: Arc<dyn Storage>) -> (Client, TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let images = DiskImageStore::open(scratch.path()).unwrap();
    let uploader = Uploader::new(Arc::new(images), "/uploads/", 5 * MB as u64);
    let lift = ignite(store, uploader).unwrap();
    (Client::tracked(lift).await.unwrap(), scratch)
}

async fn redo_main(store: MemoryStore) -> (Client, TempDir) {
    launch(Arc::new(store)).await
}

async fn json_of(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.unwrap()
}

async fn create_car(client: &Client, body: Value) -> Value {
    let response = client.post("/api/cars").header(ContentType::JSON).body(body.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Created);
    json_of(response).await
}

fn booking_json(car_id: &str, start: &str, end: &str) -> Value {
    json!({
        "carId": car_id,
        "startDate": start,
        "endDate": end,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "phone": "+61 2 9999 0000",
        "totalPrice": 1
    })
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, Vec<u8>),
}

fn multipart(parts: Vec<Part<'_>>) -> (ContentType, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let content_type = ContentType::parse_flexible(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap();
    (content_type, body)
}

/*
Cars
*/

#[rocket::async_test]
async fn test_unknown_car_is_404() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let response = client.get("/api/cars/unknown-id").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_of(response).await, json!({ "error": "Car not found" }));
}

#[rocket::async_test]
async fn test_car_lifecycle() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let car = create_car(&client, sample_car_json()).await;
    let id = car["id"].as_str().unwrap().to_string();
    assert_eq!(car["slug"], "tesla-model-3");
    assert_eq!(car["pricePerDay"], 120);
    assert_eq!(car["hasGPS"], true);

    let fetched = json_of(client.get(format!("/api/cars/{}", id)).dispatch().await).await;
    assert_eq!(fetched, car);
    let by_slug = json_of(client.get("/api/cars/slug/tesla-model-3").dispatch().await).await;
    assert_eq!(by_slug, car);

    let mut edit = sample_car_json();
    edit["name"] = json!("Tesla Model Y");
    let response = client.patch(format!("/api/cars/{}", id)).header(ContentType::JSON).body(edit.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let updated = json_of(response).await;
    assert_eq!(updated["slug"], "tesla-model-y");
    assert_eq!(updated["id"], car["id"]);

    let response = client.patch("/api/cars/nope").header(ContentType::JSON).body(edit.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let all = json_of(client.get("/api/cars").dispatch().await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    assert_eq!(client.delete(format!("/api/cars/{}", id)).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.delete(format!("/api/cars/{}", id)).dispatch().await.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_duplicate_slug_is_409() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let first = create_car(&client, sample_car_json()).await;

    let response = client.post("/api/cars").header(ContentType::JSON).body(sample_car_json().to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Conflict);
    assert!(json_of(response).await["error"].as_str().unwrap().contains("tesla-model-3"));

    let mut other = sample_car_json();
    other["name"] = json!("Tesla Model Y");
    let second = create_car(&client, other).await;
    let response = client
        .patch(format!("/api/cars/{}", second["id"].as_str().unwrap()))
        .header(ContentType::JSON)
        .body(sample_car_json().to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    let by_slug = json_of(client.get("/api/cars/slug/tesla-model-3").dispatch().await).await;
    assert_eq!(by_slug, first);
    assert_eq!(json_of(client.get("/api/cars").dispatch().await).await.as_array().unwrap().len(), 2);
}

#[rocket::async_test]
async fn test_slug_route_takes_reserved_words() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    for name in ["Quote", "Bookings"] {
        let mut body = sample_car_json();
        body["name"] = json!(name);
        let car = create_car(&client, body).await;

        let response = client.get(format!("/api/cars/slug/{}", name.to_lowercase())).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(json_of(response).await["id"], car["id"]);
    }

    let car = json_of(client.get("/api/cars/slug/quote").dispatch().await).await;
    let response = client.get(format!("/api/cars/{}/quote?start=2025-06-01&end=2025-06-02", car["id"].as_str().unwrap())).dispatch().await;
    assert_eq!(json_of(response).await["totalPrice"], 120);
}

#[rocket::async_test]
async fn test_invalid_car_names_fields() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let mut body = sample_car_json();
    body["name"] = json!("!!!");

    let response = client.post("/api/cars").header(ContentType::JSON).body(body.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let error = json_of(response).await;
    assert_eq!(error["error"], "Invalid car data");
    assert_eq!(error["details"], json!([{ "path": "name", "message": "Must contain a letter or a digit" }]));

    let mut body = sample_car_json();
    body["category"] = json!("Truck");
    let response = client.post("/api/cars").header(ContentType::JSON).body(body.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_of(response).await["details"][0]["path"], "category");

    let mut body = sample_car_json();
    body["pricePerDay"] = json!("abc");
    let response = client.post("/api/cars").header(ContentType::JSON).body(body.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_of(response).await["details"][0]["path"], "pricePerDay");

    let all = json_of(client.get("/api/cars").dispatch().await).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[rocket::async_test]
async fn test_malformed_json_is_400() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let response = client.post("/api/cars").header(ContentType::JSON).body("{ not json").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert!(json_of(response).await["error"].as_str().unwrap().starts_with("Malformed JSON body"));
}

#[rocket::async_test]
async fn test_quote() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let car = create_car(&client, sample_car_json()).await;
    let id = car["id"].as_str().unwrap();

    let quote = json_of(client.get(format!("/api/cars/{}/quote?start=2025-06-01&end=2025-06-04", id)).dispatch().await).await;
    assert_eq!(quote, json!({ "days": 3, "pricePerDay": 120, "totalPrice": 360 }));

    let backwards = json_of(client.get(format!("/api/cars/{}/quote?start=2025-06-04&end=2025-06-01", id)).dispatch().await).await;
    assert_eq!(backwards["totalPrice"], 0);

    let response = client.get("/api/cars/nope/quote?start=2025-06-01&end=2025-06-04").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

/*
Bookings
*/

#[rocket::async_test]
async fn test_booking_flow() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let mut body = sample_car_json();
    body["pricePerDay"] = json!(100);
    let car = create_car(&client, body).await;
    let id = car["id"].as_str().unwrap();

    let response = client.post("/api/bookings").header(ContentType::JSON).body(booking_json(id, "2025-06-01", "2025-06-04").to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Created);
    let booking = json_of(response).await;
    assert_eq!(booking["totalPrice"], 300);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["carName"], "Tesla Model 3!");

    let response = client.post("/api/bookings").header(ContentType::JSON).body(booking_json(id, "2025-06-03", "2025-06-05").to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Conflict);

    let response = client.post("/api/bookings").header(ContentType::JSON).body(booking_json(id, "2025-06-04", "2025-06-06").to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Created);

    let for_car = json_of(client.get(format!("/api/cars/{}/bookings", id)).dispatch().await).await;
    let starts: Vec<&str> = for_car.as_array().unwrap().iter().map(|booking| booking["startDate"].as_str().unwrap()).collect();
    assert_eq!(starts, vec!["2025-06-01", "2025-06-04"]);
    let all = json_of(client.get("/api/bookings").dispatch().await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let status_url = format!("/api/bookings/{}/status", booking["id"].as_str().unwrap());
    let response = client.patch(status_url.clone()).header(ContentType::JSON).body(r#"{"status":"confirmed"}"#).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_of(response).await["status"], "confirmed");

    let response = client.patch(status_url.clone()).header(ContentType::JSON).body(r#"{"status":"cancelled"}"#).dispatch().await;
    assert_eq!(response.status(), Status::Conflict);
    let response = client.patch(status_url).header(ContentType::JSON).body(r#"{"status":"lost"}"#).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let response = client.patch("/api/bookings/nope/status").header(ContentType::JSON).body(r#"{"status":"confirmed"}"#).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_booking_rejections() {
    let (client, _scratch) = redo_main(MemoryStore::seeded()).await;
    let mercedes = json_of(client.get("/api/cars/slug/mercedes-benz-s-class").dispatch().await).await;
    let mercedes_id = mercedes["id"].as_str().unwrap();

    let response = client.post("/api/bookings").header(ContentType::JSON).body(booking_json(mercedes_id, "2025-06-01", "2025-06-04").to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Conflict);

    let response = client.post("/api/bookings").header(ContentType::JSON).body(booking_json("nope", "2025-06-01", "2025-06-04").to_string()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let mut bad_email = booking_json(mercedes_id, "2025-06-01", "2025-06-04");
    bad_email["email"] = json!("not-an-email");
    let response = client.post("/api/bookings").header(ContentType::JSON).body(bad_email.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_of(response).await["details"][0]["path"], "email");

    assert!(json_of(client.get("/api/bookings").dispatch().await).await.as_array().unwrap().is_empty());
}

/*
Settings
*/

#[rocket::async_test]
async fn test_settings_defaults_and_update() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let defaults = WebsiteSettings::default();
    let settings = json_of(client.get("/api/settings").dispatch().await).await;
    assert_eq!(settings["websiteName"], defaults.website_name.as_str());

    let body = json!({ "websiteName": "Coastal Cars", "email": "hi@coastal.example", "favicon": "", "twitterUrl": "https://twitter.com/coastal" });
    let response = client.put("/api/settings").header(ContentType::JSON).body(body.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let saved = json_of(response).await;
    assert_eq!(saved["websiteName"], "Coastal Cars");
    assert_eq!(saved["favicon"], "/favicon.png");

    let settings = json_of(client.get("/api/settings").dispatch().await).await;
    assert_eq!(settings, saved);
    assert_eq!(settings["twitterUrl"], "https://twitter.com/coastal");

    let response = client.put("/api/settings").header(ContentType::JSON).body(r#"{"websiteName": 7}"#).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_settings_fall_back_when_unreadable() {
    let (client, _scratch) = launch(Arc::new(UnreadableSettings(MemoryStore::seeded()))).await;
    let response = client.get("/api/settings").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_of(response).await, serde_json::to_value(WebsiteSettings::default()).unwrap());

    let home = client.get("/").dispatch().await.into_string().await.unwrap();
    assert!(home.contains("Premium Car Rentals Australia"));
}

#[rocket::async_test]
async fn test_settings_form_keeps_logo_on_failed_upload() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let (content_type, body) = multipart(vec![
        Part::Text("websiteName", "Coastal Cars"),
        Part::File("logo", "logo.txt", "text/plain", b"not an image".to_vec()),
        Part::File("favicon", "icon.png", "image/png", vec![1, 2, 3]),
    ]);
    let response = client.post("/api/settings/form").header(content_type).body(body).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let result = json_of(response).await;
    assert_eq!(result["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(result["settings"]["websiteName"], "Coastal Cars");
    assert_eq!(result["settings"]["logo"], "");
    assert!(result["settings"]["favicon"].as_str().unwrap().starts_with("/uploads/"));
    assert_eq!(result["settings"]["companyName"], WebsiteSettings::default().company_name.as_str());
}

/*
Uploads
*/

#[rocket::async_test]
async fn test_upload_serve_delete() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;
    let (content_type, body) = multipart(vec![Part::File("image", "car.jpg", "image/jpeg", vec![9u8; 4 * MB])]);
    let response = client.post("/api/uploads").header(content_type).body(body).dispatch().await;
    assert_eq!(response.status(), Status::Created);
    let uploaded = json_of(response).await;
    let url = uploaded["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));
    assert_eq!(uploaded["urls"], json!([url]));

    let served = client.get(url.clone()).dispatch().await;
    assert_eq!(served.status(), Status::Ok);
    assert_eq!(served.content_type(), Some(ContentType::JPEG));
    assert_eq!(served.into_bytes().await.unwrap().len(), 4 * MB);

    assert_eq!(client.delete(format!("/api/uploads?url={}", url)).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.delete(format!("/api/uploads?url={}", url)).dispatch().await.status(), Status::NotFound);
    assert_eq!(client.get(url).dispatch().await.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_upload_rejections() {
    let (client, _scratch) = redo_main(MemoryStore::new()).await;

    let (content_type, body) = multipart(vec![Part::File("image", "big.jpg", "image/jpeg", vec![0u8; 6 * MB])]);
    let response = client.post("/api/uploads").header(content_type).body(body).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let (content_type, body) = multipart(vec![
        Part::File("image", "a.png", "image/png", vec![1, 2, 3]),
        Part::File("image", "notes.txt", "text/plain", b"hello".to_vec()),
    ]);
    let response = client.post("/api/uploads").header(content_type).body(body).dispatch().await;
    assert_eq!(response.status(), Status::UnsupportedMediaType);

    let (content_type, body) = multipart(vec![Part::Text("caption", "no file")]);
    let response = client.post("/api/uploads").header(content_type).body(body).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

/*
Pages
*/

#[rocket::async_test]
async fn test_catalog_pages() {
    let (client, _scratch) = redo_main(MemoryStore::seeded()).await;
    let home = client.get("/").dispatch().await.into_string().await.unwrap();
    assert!(home.contains("Showing 6 vehicles"));
    assert!(home.contains("<title>Our Fleet | Premium Car Rentals Australia</title>"));

    let suv = client.get("/cars?category=SUV&transmission=all").dispatch().await.into_string().await.unwrap();
    assert!(suv.contains("Showing 2 vehicles"));
    assert!(suv.contains("/cars/bmw-x5"));

    let none = client.get("/cars?search=zeppelin").dispatch().await.into_string().await.unwrap();
    assert!(none.contains("No vehicles found"));
}

#[rocket::async_test]
async fn test_car_page_and_booking_form() {
    let (client, _scratch) = redo_main(MemoryStore::seeded()).await;
    let page = client.get("/cars/tesla-model-3?start=2025-06-01&end=2025-06-04").dispatch().await.into_string().await.unwrap();
    assert!(page.contains("Tesla Model 3"));
    assert!(page.contains("$360"));

    assert_eq!(client.get("/cars/zeppelin").dispatch().await.status(), Status::NotFound);

    let form = "startDate=2025-06-01&endDate=2025-06-04&firstName=Ada&lastName=Lovelace&email=ada%40example.com&phone=123&address=&notes=";
    let response = client.post("/cars/tesla-model-3/book").header(ContentType::Form).body(form).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let confirmation = response.into_string().await.unwrap();
    assert!(confirmation.contains("Booking Submitted!"));
    assert!(confirmation.contains("$360"));

    let response = client.post("/cars/tesla-model-3/book").header(ContentType::Form).body(form).dispatch().await;
    assert_eq!(response.status(), Status::Conflict);
    assert!(response.into_string().await.unwrap().contains("already booked"));

    let invalid = "startDate=2025-07-01&endDate=2025-07-02&firstName=Ada&lastName=Lovelace&email=nope&phone=123";
    let response = client.post("/cars/tesla-model-3/book").header(ContentType::Form).body(invalid).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert!(response.into_string().await.unwrap().contains("Invalid email"));
}
