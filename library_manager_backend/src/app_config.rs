use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book))
                        .route(web::delete().to(handlers::delete_book)),
                ),
        );
}
